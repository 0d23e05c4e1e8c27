//! G-code command model
//!
//! Every emitted line is a [`GcodeLine`]: a verbatim protocol command, a
//! comment, or a motion command built from optional axis fields. Rendering
//! goes through `Display` and always produces exactly one line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places for coordinates.
pub const AXIS_PRECISION: usize = 3;
/// Decimal places for extrusion amounts derived from the bead model.
pub const EXTRUSION_PRECISION: usize = 5;
/// Decimal places for directly specified filament distances.
pub const DISTANCE_PRECISION: usize = 2;
/// Decimal places for feed rates.
pub const FEEDRATE_PRECISION: usize = 2;

/// Motion verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// G0: rapid (travel) move
    Rapid,
    /// G1: linear move
    Linear,
}

impl MotionKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rapid => "G0",
            Self::Linear => "G1",
        }
    }
}

/// A numeric field with the precision it renders at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub value: f64,
    pub precision: usize,
}

impl Field {
    fn new(value: f64, precision: usize) -> Self {
        Self { value, precision }
    }
}

/// G0/G1 move with optional X, Y, Z, E and F words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub kind: MotionKind,
    x: Option<Field>,
    y: Option<Field>,
    z: Option<Field>,
    e: Option<Field>,
    f: Option<Field>,
}

impl MotionCommand {
    pub fn new(kind: MotionKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            z: None,
            e: None,
            f: None,
        }
    }

    /// G0 with no fields set
    pub fn rapid() -> Self {
        Self::new(MotionKind::Rapid)
    }

    /// G1 with no fields set
    pub fn linear() -> Self {
        Self::new(MotionKind::Linear)
    }

    pub fn x(mut self, value: f64) -> Self {
        self.x = Some(Field::new(value, AXIS_PRECISION));
        self
    }

    pub fn y(mut self, value: f64) -> Self {
        self.y = Some(Field::new(value, AXIS_PRECISION));
        self
    }

    pub fn z(mut self, value: f64) -> Self {
        self.z = Some(Field::new(value, AXIS_PRECISION));
        self
    }

    /// Extrusion amount computed from the bead model
    pub fn e(mut self, value: f64) -> Self {
        self.e = Some(Field::new(value, EXTRUSION_PRECISION));
        self
    }

    /// Filament distance given directly (retract, unretract, prime)
    pub fn e_distance(mut self, value: f64) -> Self {
        self.e = Some(Field::new(value, DISTANCE_PRECISION));
        self
    }

    /// Feed rate (mm/min)
    pub fn f(mut self, value: f64) -> Self {
        self.f = Some(Field::new(value, FEEDRATE_PRECISION));
        self
    }

    pub fn x_value(&self) -> Option<f64> {
        self.x.map(|f| f.value)
    }

    pub fn y_value(&self) -> Option<f64> {
        self.y.map(|f| f.value)
    }

    pub fn z_value(&self) -> Option<f64> {
        self.z.map(|f| f.value)
    }

    pub fn e_value(&self) -> Option<f64> {
        self.e.map(|f| f.value)
    }

    pub fn f_value(&self) -> Option<f64> {
        self.f.map(|f| f.value)
    }

    /// True when the move feeds or withdraws filament but does not move any axis
    pub fn is_extruder_only(&self) -> bool {
        self.e.is_some() && self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.code())?;
        let words = [
            ('X', self.x),
            ('Y', self.y),
            ('Z', self.z),
            ('E', self.e),
            ('F', self.f),
        ];
        for (letter, field) in words {
            if let Some(Field { value, precision }) = field {
                // -0.0 + 0.0 == +0.0, so zero never renders with a sign
                write!(f, " {}{:.*}", letter, precision, value + 0.0)?;
            }
        }
        Ok(())
    }
}

/// One line of a generated program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GcodeLine {
    /// Pre-formatted command, emitted verbatim
    Raw(String),
    /// Comment text, emitted after `;`
    Comment(String),
    /// G0/G1 move
    Motion(MotionCommand),
}

impl GcodeLine {
    pub fn raw(line: impl Into<String>) -> Self {
        Self::Raw(line.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub fn as_motion(&self) -> Option<&MotionCommand> {
        match self {
            Self::Motion(motion) => Some(motion),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&str> {
        match self {
            Self::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// G28
    pub fn home_all() -> Self {
        Self::raw("G28")
    }

    /// G28 X0 Y0
    pub fn home_xy() -> Self {
        Self::raw("G28 X0 Y0")
    }

    /// G90
    pub fn absolute_positioning() -> Self {
        Self::raw("G90")
    }

    /// G91
    pub fn relative_positioning() -> Self {
        Self::raw("G91")
    }

    /// G92 E0
    pub fn reset_extruder() -> Self {
        Self::raw("G92 E0")
    }

    /// M82
    pub fn absolute_extrusion() -> Self {
        Self::raw("M82")
    }

    /// M83
    pub fn relative_extrusion() -> Self {
        Self::raw("M83")
    }

    /// M84
    pub fn disable_steppers() -> Self {
        Self::raw("M84")
    }

    /// M104: set hotend temperature without waiting
    pub fn set_hotend_temp(celsius: f64) -> Self {
        Self::raw(format!("M104 S{:.0}", celsius + 0.0))
    }

    /// M109: set hotend temperature and wait
    pub fn wait_hotend_temp(celsius: f64) -> Self {
        Self::raw(format!("M109 S{:.0}", celsius + 0.0))
    }

    /// M140: set bed temperature without waiting
    pub fn set_bed_temp(celsius: f64) -> Self {
        Self::raw(format!("M140 S{:.0}", celsius + 0.0))
    }

    /// M190: set bed temperature and wait
    pub fn wait_bed_temp(celsius: f64) -> Self {
        Self::raw(format!("M190 S{:.0}", celsius + 0.0))
    }

    /// M105
    pub fn report_temps() -> Self {
        Self::raw("M105")
    }

    /// M106 with a 0-255 duty value
    pub fn set_fan(pwm: u8) -> Self {
        Self::raw(format!("M106 S{}", pwm))
    }

    /// M107
    pub fn fan_off() -> Self {
        Self::raw("M107")
    }
}

impl From<MotionCommand> for GcodeLine {
    fn from(motion: MotionCommand) -> Self {
        Self::Motion(motion)
    }
}

impl fmt::Display for GcodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(line) => write!(f, "{}", line),
            Self::Comment(text) => write!(f, ";{}", text),
            Self::Motion(motion) => write!(f, "{}", motion),
        }
    }
}
