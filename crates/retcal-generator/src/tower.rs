//! Calibration tower
//!
//! The tower is a 10 x 10 mm square traced once per layer in relative
//! coordinates. Each side is split into four 10 mm retraction segments, so
//! one square exercises all sixteen retraction distances. Layers are grouped
//! into sections that share a retraction speed, hotend temperature and fan
//! speed.

use retcal_core::{CalibrationConfig, GcodeLine, MotionCommand, ParameterResult};
use tracing::debug;

/// Length of one retraction segment (mm).
pub const SEGMENT_LENGTH: f64 = 10.0;
/// Distance travelled away from the tower after a retraction (mm).
pub const TRAVEL_OUT: f64 = 10.0;
/// Filament length each corner marker stroke is extruded as (mm).
pub const MARKER_STROKE: f64 = 1.0;
/// Number of the first tower layer; layers 1 and 2 are the raft.
pub const FIRST_TOWER_LAYER: u32 = 3;

/// Side of the square, in the order the tower traces them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bottom,
    Right,
    Top,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// Unit vector the side is printed along.
    pub fn direction(&self) -> (f64, f64) {
        match self {
            Self::Bottom => (1.0, 0.0),
            Self::Right => (0.0, 1.0),
            Self::Top => (-1.0, 0.0),
            Self::Left => (0.0, -1.0),
        }
    }

    /// Unit vector pointing away from the square.
    pub fn outward(&self) -> (f64, f64) {
        match self {
            Self::Bottom => (0.0, -1.0),
            Self::Right => (1.0, 0.0),
            Self::Top => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
        }
    }

    /// Sub-test indices tested along this side.
    pub fn sub_tests(&self) -> std::ops::Range<u32> {
        let first = match self {
            Self::Bottom => 0,
            Self::Right => 4,
            Self::Top => 8,
            Self::Left => 12,
        };
        first..first + 4
    }

    /// Strokes of the corner marker printed before this side.
    pub fn corner_marker(&self) -> [(f64, f64); 4] {
        match self {
            Self::Bottom => [(-2.0, 0.0), (0.0, -2.0), (2.0, 0.0), (0.0, 2.0)],
            Self::Right => [(1.0, 0.0), (0.0, -1.0), (-1.0, 0.0), (0.0, 1.0)],
            Self::Top => [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)],
            Self::Left => [(-1.0, 0.0), (0.0, 1.0), (1.0, 0.0), (0.0, -1.0)],
        }
    }
}

/// Set only the axes a planar offset actually moves along
fn planar(mut cmd: MotionCommand, (dx, dy): (f64, f64), scale: f64) -> MotionCommand {
    if dx != 0.0 {
        cmd = cmd.x(dx * scale);
    }
    if dy != 0.0 {
        cmd = cmd.y(dy * scale);
    }
    cmd
}

/// Generator for the tower sections of a calibration program
pub struct TowerGenerator<'a> {
    config: &'a CalibrationConfig,
    e_segment: f64,
    e_marker: f64,
}

impl<'a> TowerGenerator<'a> {
    /// Create a generator, computing the extrusion amounts once
    pub fn new(config: &'a CalibrationConfig) -> ParameterResult<Self> {
        Ok(Self {
            config,
            e_segment: config.e_value(SEGMENT_LENGTH)?,
            e_marker: config.e_value(MARKER_STROKE)?,
        })
    }

    fn print_feed(&self) -> f64 {
        f64::from(self.config.print_speed)
    }

    fn travel_feed(&self) -> f64 {
        f64::from(self.config.travel_speed)
    }

    /// Print one segment along `side`, then retract, travel out and back,
    /// and unretract by the distance for sub-test `index`.
    pub fn retraction_segment(
        &self,
        side: Side,
        index: u32,
        section: u32,
        gcode: &mut Vec<GcodeLine>,
    ) {
        let distance = self.config.retraction_distance(index);
        let feedrate = self.config.retraction_feedrate(section);

        gcode.push(
            planar(MotionCommand::linear(), side.direction(), SEGMENT_LENGTH)
                .e(self.e_segment)
                .f(self.print_feed())
                .into(),
        );
        gcode.push(MotionCommand::linear().e_distance(-distance).f(feedrate).into());
        gcode.push(
            planar(MotionCommand::rapid(), side.outward(), TRAVEL_OUT)
                .f(self.travel_feed())
                .into(),
        );
        gcode.push(
            planar(MotionCommand::rapid(), side.outward(), -TRAVEL_OUT)
                .f(self.travel_feed())
                .into(),
        );
        gcode.push(MotionCommand::linear().e_distance(distance).f(feedrate).into());
    }

    /// Small extruded mark at the corner before `side`.
    pub fn corner_marker(&self, side: Side, gcode: &mut Vec<GcodeLine>) {
        for stroke in side.corner_marker() {
            gcode.push(
                planar(MotionCommand::linear(), stroke, 1.0)
                    .e(self.e_marker)
                    .f(self.print_feed())
                    .into(),
            );
        }
    }

    /// Trace the square once: sixteen retraction segments, four per side.
    pub fn square(&self, section: u32, with_markers: bool, gcode: &mut Vec<GcodeLine>) {
        for side in Side::ALL {
            if with_markers {
                self.corner_marker(side, gcode);
            }
            for index in side.sub_tests() {
                self.retraction_segment(side, index, section, gcode);
            }
        }
    }

    /// Emit one section starting at layer number `layer`.
    ///
    /// Returns the number of the next layer. A section with no layers emits
    /// nothing.
    pub fn section(&self, section: u32, mut layer: u32, gcode: &mut Vec<GcodeLine>) -> u32 {
        let layers = self.config.layers_per_test;
        if layers == 0 {
            return layer;
        }

        debug!(
            section,
            first_layer = layer,
            layers,
            hotend_temp = self.config.hotend_temp(section),
            "Generating tower section"
        );

        gcode.push(GcodeLine::set_fan(self.config.fan_pwm(section)));
        gcode.push(GcodeLine::set_hotend_temp(self.config.hotend_temp(section)));

        for n in 0..layers {
            gcode.push(GcodeLine::comment(format!("Layer {}", layer)));
            self.square(section, n == 0, gcode);
            gcode.push(MotionCommand::linear().z(self.config.layer_height).into());
            layer += 1;
        }

        layer
    }

    /// Every section, with the layer counter continuing across them.
    pub fn generate(&self, gcode: &mut Vec<GcodeLine>) -> u32 {
        (0..self.config.num_tests).fold(FIRST_TOWER_LAYER, |layer, section| {
            self.section(section, layer, gcode)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CalibrationConfig {
        CalibrationConfig {
            retraction_dist_init: 2.0,
            retraction_dist_delta: 0.2,
            retraction_speed_init: 35.0,
            retraction_speed_delta: 5.0,
            print_speed: 1800,
            travel_speed: 9000,
            num_tests: 1,
            layers_per_test: 1,
            ..Default::default()
        }
    }

    fn render(lines: &[GcodeLine]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_sides_cover_every_sub_test_once() {
        let indices: Vec<u32> = Side::ALL.iter().flat_map(|s| s.sub_tests()).collect();
        assert_eq!(indices, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_square_closes() {
        for side in Side::ALL {
            let (dx, dy) = side.direction();
            let (ox, oy) = side.outward();
            assert_eq!(dx * ox + dy * oy, 0.0);
        }
        let (sx, sy) = Side::ALL.iter().fold((0.0, 0.0), |(x, y), s| {
            let (dx, dy) = s.direction();
            (x + dx, y + dy)
        });
        assert_eq!((sx, sy), (0.0, 0.0));
    }

    #[test]
    fn test_retraction_segment_lines() {
        let config = config();
        let tower = TowerGenerator::new(&config).unwrap();
        let mut gcode = Vec::new();
        tower.retraction_segment(Side::Right, 5, 1, &mut gcode);

        let lines = render(&gcode);
        let e = format!("{:.5}", config.e_value(10.0).unwrap());
        assert_eq!(lines[0], format!("G1 Y10.000 E{} F1800.00", e));
        assert_eq!(lines[1], "G1 E-3.00 F2400.00");
        assert_eq!(lines[2], "G0 X10.000 F9000.00");
        assert_eq!(lines[3], "G0 X-10.000 F9000.00");
        assert_eq!(lines[4], "G1 E3.00 F2400.00");
    }

    #[test]
    fn test_corner_marker_uses_short_strokes() {
        let config = config();
        let tower = TowerGenerator::new(&config).unwrap();
        let mut gcode = Vec::new();
        tower.corner_marker(Side::Bottom, &mut gcode);

        let lines = render(&gcode);
        let e = format!("{:.5}", config.e_value(1.0).unwrap());
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("G1 X-2.000 E{} F1800.00", e));
        assert_eq!(lines[3], format!("G1 Y2.000 E{} F1800.00", e));
    }

    #[test]
    fn test_section_marks_only_first_layer() {
        let config = CalibrationConfig {
            layers_per_test: 3,
            ..config()
        };
        let tower = TowerGenerator::new(&config).unwrap();
        let mut gcode = Vec::new();
        let next = tower.section(0, 7, &mut gcode);
        assert_eq!(next, 10);

        let lines = render(&gcode);
        assert_eq!(lines[0], "M106 S255");
        assert_eq!(lines[1], "M104 S215");
        assert_eq!(lines[2], ";Layer 7");

        // header + 3 x (comment + 16 segments + z step) + 16 marker strokes
        assert_eq!(lines.len(), 2 + 3 * (1 + 16 * 5 + 1) + 16);
        let z_steps = lines.iter().filter(|l| *l == "G1 Z0.200").count();
        assert_eq!(z_steps, 3);
    }

    #[test]
    fn test_empty_section() {
        let config = CalibrationConfig {
            layers_per_test: 0,
            ..config()
        };
        let tower = TowerGenerator::new(&config).unwrap();
        let mut gcode = Vec::new();
        assert_eq!(tower.section(0, 3, &mut gcode), 3);
        assert!(gcode.is_empty());
    }

    #[test]
    fn test_layer_counter_threads_across_sections() {
        let config = CalibrationConfig {
            num_tests: 3,
            layers_per_test: 2,
            ..config()
        };
        let tower = TowerGenerator::new(&config).unwrap();
        let mut gcode = Vec::new();
        assert_eq!(tower.generate(&mut gcode), FIRST_TOWER_LAYER + 6);

        let layers: Vec<&str> = gcode.iter().filter_map(GcodeLine::as_comment).collect();
        assert_eq!(
            layers,
            vec!["Layer 3", "Layer 4", "Layer 5", "Layer 6", "Layer 7", "Layer 8"]
        );
    }
}
