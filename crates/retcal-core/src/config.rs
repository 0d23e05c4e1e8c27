//! Calibration parameters
//!
//! [`CalibrationConfig`] holds every printer and test parameter needed to
//! generate a retraction calibration program, plus the per-section and
//! per-sub-test values derived from them.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ParameterError, ParameterResult};

/// Number of retraction sub-tests traced around one square.
pub const SUB_TESTS_PER_SQUARE: u32 = 16;

/// Half the raft edge length (mm). The raft is centred on the bed.
pub const RAFT_HALF_SIZE: f64 = 30.0;

/// Parameters for one retraction calibration print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Retraction distance for sub-test 0 (mm)
    pub retraction_dist_init: f64,
    /// Retraction distance added per sub-test index (mm)
    pub retraction_dist_delta: f64,
    /// Retraction speed for section 0 (mm/s)
    pub retraction_speed_init: f64,
    /// Retraction speed added per section (mm/s)
    pub retraction_speed_delta: f64,
    /// Hotend temperature for section 0 (°C)
    pub hotend_temp_init: f64,
    /// Hotend temperature added per section (°C)
    pub hotend_temp_change: f64,
    /// Fan speed for section 0 (percent)
    pub fan_speed_init: f64,
    /// Fan speed added per section (percent)
    pub fan_speed_delta: f64,
    /// Layer height (mm)
    pub layer_height: f64,
    /// Number of layers printed with one section's settings
    pub layers_per_test: u32,
    /// Number of sections
    pub num_tests: u32,
    /// Bed size in X (mm)
    pub bed_shape_x: f64,
    /// Bed size in Y (mm)
    pub bed_shape_y: f64,
    /// Extrusion feed rate (mm/min)
    pub print_speed: u32,
    /// Travel feed rate (mm/min)
    pub travel_speed: u32,
    /// Nozzle diameter (mm)
    pub nozzle_diameter: f64,
    /// Filament diameter (mm)
    pub filament_diameter: f64,
    /// Flow multiplier
    pub extrusion_multiplier: f64,
    /// Bed temperature (°C)
    pub bed_temp: f64,
    /// Raw G-code appended to the start sequence
    pub custom_gcode: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            retraction_dist_init: 1.0,
            retraction_dist_delta: 0.2,
            retraction_speed_init: 35.0,
            retraction_speed_delta: 5.0,
            hotend_temp_init: 215.0,
            hotend_temp_change: -5.0,
            fan_speed_init: 100.0,
            fan_speed_delta: 0.0,
            layer_height: 0.2,
            layers_per_test: 15,
            num_tests: 5,
            bed_shape_x: 220.0,
            bed_shape_y: 220.0,
            print_speed: 1800,
            travel_speed: 9000,
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            extrusion_multiplier: 1.0,
            bed_temp: 60.0,
            custom_gcode: String::new(),
        }
    }
}

impl CalibrationConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    fn float_fields(&self) -> [(&'static str, f64); 14] {
        [
            ("retraction_dist_init", self.retraction_dist_init),
            ("retraction_dist_delta", self.retraction_dist_delta),
            ("retraction_speed_init", self.retraction_speed_init),
            ("retraction_speed_delta", self.retraction_speed_delta),
            ("hotend_temp_init", self.hotend_temp_init),
            ("hotend_temp_change", self.hotend_temp_change),
            ("fan_speed_init", self.fan_speed_init),
            ("fan_speed_delta", self.fan_speed_delta),
            ("layer_height", self.layer_height),
            ("bed_shape_x", self.bed_shape_x),
            ("bed_shape_y", self.bed_shape_y),
            ("nozzle_diameter", self.nozzle_diameter),
            ("filament_diameter", self.filament_diameter),
            ("extrusion_multiplier", self.extrusion_multiplier),
        ]
    }

    /// Validate the configuration.
    ///
    /// Returns the first offending field. A nozzle that is not wider than the
    /// layer height is accepted with a warning.
    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite {
                    name: name.to_string(),
                });
            }
        }
        if !self.bed_temp.is_finite() {
            return Err(ParameterError::NonFinite {
                name: "bed_temp".to_string(),
            });
        }

        let positive = [
            ("layer_height", self.layer_height),
            ("nozzle_diameter", self.nozzle_diameter),
            ("filament_diameter", self.filament_diameter),
            ("extrusion_multiplier", self.extrusion_multiplier),
            ("bed_shape_x", self.bed_shape_x),
            ("bed_shape_y", self.bed_shape_y),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ParameterError::invalid(name, "must be > 0"));
            }
        }

        if self.print_speed == 0 {
            return Err(ParameterError::invalid("print_speed", "must be > 0"));
        }
        if self.travel_speed == 0 {
            return Err(ParameterError::invalid("travel_speed", "must be > 0"));
        }

        // Per-section values are linear in the section, so the first and
        // last sections bound all of them.
        if let Some(last) = self.num_tests.checked_sub(1) {
            for section in [0, last] {
                let speed = self.retraction_feedrate(section);
                if speed <= 0.0 {
                    let name = if section == 0 {
                        "retraction_speed_init"
                    } else {
                        "retraction_speed_delta"
                    };
                    return Err(ParameterError::invalid(
                        name,
                        format!("retraction speed in section {} is {} mm/min", section, speed),
                    ));
                }

                let temp = self.hotend_temp(section);
                if temp < 0.0 {
                    let name = if section == 0 {
                        "hotend_temp_init"
                    } else {
                        "hotend_temp_change"
                    };
                    return Err(ParameterError::invalid(
                        name,
                        format!("hotend temperature in section {} is {} °C", section, temp),
                    ));
                }
            }
        }

        if self.nozzle_diameter <= self.layer_height {
            warn!(
                nozzle_diameter = self.nozzle_diameter,
                layer_height = self.layer_height,
                "Layer height is not below the nozzle diameter, extrusion will be unrealistic"
            );
        }

        Ok(())
    }

    /// Cross-sectional area of one extruded bead (mm²).
    ///
    /// A rectangle of `(nozzle - layer) x layer` plus two half circles of
    /// diameter `layer`.
    pub fn bead_area(&self) -> f64 {
        let h = self.layer_height;
        (self.nozzle_diameter - h) * h + PI * (h / 2.0).powi(2)
    }

    /// Filament length to feed for a linear move of `length` mm.
    pub fn e_value(&self, length: f64) -> ParameterResult<f64> {
        if !(self.filament_diameter > 0.0) {
            return Err(ParameterError::invalid(
                "filament_diameter",
                "must be > 0 to compute extrusion amounts",
            ));
        }
        if !(self.extrusion_multiplier > 0.0) {
            return Err(ParameterError::invalid(
                "extrusion_multiplier",
                "must be > 0 to compute extrusion amounts",
            ));
        }

        let filament_area = PI * self.filament_diameter.powi(2) / self.extrusion_multiplier;
        let e = self.bead_area() * length * 4.0 / filament_area;
        if !e.is_finite() {
            return Err(ParameterError::NonFinite {
                name: "e_value".to_string(),
            });
        }
        Ok(e)
    }

    /// Retraction distance for sub-test `index` (mm).
    pub fn retraction_distance(&self, index: u32) -> f64 {
        self.retraction_dist_init + self.retraction_dist_delta * f64::from(index)
    }

    /// Retraction speed for `section` (mm/s).
    pub fn retraction_speed(&self, section: u32) -> f64 {
        self.retraction_speed_init + self.retraction_speed_delta * f64::from(section)
    }

    /// Retraction feed rate for `section` (mm/min).
    pub fn retraction_feedrate(&self, section: u32) -> f64 {
        self.retraction_speed(section) * 60.0
    }

    /// Hotend temperature for `section` (°C).
    pub fn hotend_temp(&self, section: u32) -> f64 {
        self.hotend_temp_init + self.hotend_temp_change * f64::from(section)
    }

    /// Fan speed for `section` (percent).
    pub fn fan_percent(&self, section: u32) -> f64 {
        self.fan_speed_init + self.fan_speed_delta * f64::from(section)
    }

    /// Fan speed for `section` on the 0-255 device scale.
    pub fn fan_pwm(&self, section: u32) -> u8 {
        let pwm = (self.fan_percent(section) * 255.0 / 100.0).round();
        if !(0.0..=255.0).contains(&pwm) {
            warn!(section, pwm, "Fan speed outside 0-100%, clamping");
        }
        pwm.clamp(0.0, 255.0) as u8
    }

    /// Bottom-left corner of the raft (mm).
    pub fn raft_origin(&self) -> (f64, f64) {
        (
            self.bed_shape_x / 2.0 - RAFT_HALF_SIZE,
            self.bed_shape_y / 2.0 - RAFT_HALF_SIZE,
        )
    }

    /// Number of tower layers across all sections.
    pub fn total_layers(&self) -> u32 {
        self.num_tests.saturating_mul(self.layers_per_test)
    }

    /// Every input as `(name, value)`, in declaration order.
    pub fn inputs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("retraction_dist_init", self.retraction_dist_init.to_string()),
            ("retraction_dist_delta", self.retraction_dist_delta.to_string()),
            ("retraction_speed_init", self.retraction_speed_init.to_string()),
            ("retraction_speed_delta", self.retraction_speed_delta.to_string()),
            ("hotend_temp_init", self.hotend_temp_init.to_string()),
            ("hotend_temp_change", self.hotend_temp_change.to_string()),
            ("fan_speed_init", self.fan_speed_init.to_string()),
            ("fan_speed_delta", self.fan_speed_delta.to_string()),
            ("layer_height", self.layer_height.to_string()),
            ("layers_per_test", self.layers_per_test.to_string()),
            ("num_tests", self.num_tests.to_string()),
            ("bed_shape_x", self.bed_shape_x.to_string()),
            ("bed_shape_y", self.bed_shape_y.to_string()),
            ("print_speed", self.print_speed.to_string()),
            ("travel_speed", self.travel_speed.to_string()),
            ("nozzle_diameter", self.nozzle_diameter.to_string()),
            ("filament_diameter", self.filament_diameter.to_string()),
            ("extrusion_multiplier", self.extrusion_multiplier.to_string()),
            ("bed_temp", self.bed_temp.to_string()),
            // Debug formatting keeps multi-line G-code on one comment line
            ("custom_gcode", format!("{:?}", self.custom_gcode)),
        ]
    }
}
