//! Priming raft
//!
//! Two crosshatched 60 x 60 mm layers centred on the bed. The first layer
//! runs its strokes along X, the second along Y, and laying them down also
//! gets filament flowing before the tower starts.

use retcal_core::{CalibrationConfig, GcodeLine, MotionCommand, ParameterResult, RAFT_HALF_SIZE};
use tracing::debug;

/// Length of one raft stroke (mm).
pub const RAFT_STROKE: f64 = 2.0 * RAFT_HALF_SIZE;
/// Out-and-back stroke pairs per raft layer.
pub const RAFT_PASSES: u32 = 30;
/// Offset of the first tower corner from the raft origin (mm).
pub const TOWER_OFFSET: f64 = 5.0;
/// Z height the nozzle lifts to before travelling to the raft (mm).
pub const APPROACH_HEIGHT: f64 = 2.0;

/// Direction the extrusion strokes of a raft layer run in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeAxis {
    X,
    Y,
}

impl StrokeAxis {
    fn stroke(&self, length: f64) -> MotionCommand {
        match self {
            Self::X => MotionCommand::linear().x(length),
            Self::Y => MotionCommand::linear().y(length),
        }
    }

    fn step(&self, length: f64) -> MotionCommand {
        match self {
            Self::X => MotionCommand::rapid().y(length),
            Self::Y => MotionCommand::rapid().x(length),
        }
    }
}

/// One raft layer in relative coordinates.
///
/// `fed` is the filament fed so far; the new total is returned.
pub fn raft_layer(
    config: &CalibrationConfig,
    axis: StrokeAxis,
    e_stroke: f64,
    mut fed: f64,
    gcode: &mut Vec<GcodeLine>,
) -> f64 {
    let print_feed = f64::from(config.print_speed / 2);
    let travel_feed = f64::from(config.travel_speed);

    for _ in 0..RAFT_PASSES {
        for direction in [1.0, -1.0] {
            gcode.push(axis.stroke(direction * RAFT_STROKE).e(e_stroke).f(print_feed).into());
            fed += e_stroke;
            gcode.push(axis.step(1.0).f(travel_feed).into());
        }
    }

    fed
}

/// Full raft, from the approach move to the tower start position.
///
/// Returns the total filament fed while printing it.
pub fn generate_raft(
    config: &CalibrationConfig,
    gcode: &mut Vec<GcodeLine>,
) -> ParameterResult<f64> {
    let (origin_x, origin_y) = config.raft_origin();
    let layer_height = config.layer_height;
    let travel_feed = f64::from(config.travel_speed);
    let e_stroke = config.e_value(RAFT_STROKE)?;

    gcode.push(GcodeLine::comment(" Start Movement"));
    gcode.push(GcodeLine::comment(""));
    gcode.push(MotionCommand::linear().z(APPROACH_HEIGHT).into());
    gcode.push(
        MotionCommand::rapid()
            .x(origin_x)
            .y(origin_y)
            .z(layer_height)
            .f(travel_feed)
            .into(),
    );
    gcode.push(GcodeLine::comment(""));

    gcode.push(GcodeLine::comment("Layer 1"));
    gcode.push(GcodeLine::relative_extrusion());
    gcode.push(GcodeLine::relative_positioning());
    let mut fed = raft_layer(config, StrokeAxis::X, e_stroke, 0.0, gcode);

    gcode.push(GcodeLine::absolute_positioning());
    gcode.push(MotionCommand::rapid().z(layer_height * 3.0).f(travel_feed).into());
    gcode.push(
        MotionCommand::rapid()
            .x(origin_x)
            .y(origin_y)
            .z(layer_height * 2.0)
            .f(travel_feed)
            .into(),
    );

    gcode.push(GcodeLine::comment("Layer 2"));
    gcode.push(GcodeLine::relative_positioning());
    fed = raft_layer(config, StrokeAxis::Y, e_stroke, fed, gcode);

    gcode.push(GcodeLine::absolute_positioning());
    gcode.push(
        MotionCommand::rapid()
            .x(origin_x + TOWER_OFFSET)
            .y(origin_y + TOWER_OFFSET)
            .z(layer_height * 3.0)
            .f(travel_feed)
            .into(),
    );

    debug!(filament_mm = fed, "Raft generated");
    Ok(fed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CalibrationConfig {
        CalibrationConfig {
            bed_shape_x: 220.0,
            bed_shape_y: 220.0,
            layer_height: 0.2,
            print_speed: 1801,
            travel_speed: 9000,
            ..Default::default()
        }
    }

    #[test]
    fn test_raft_layer_shape() {
        let config = config();
        let mut gcode = Vec::new();
        let fed = raft_layer(&config, StrokeAxis::X, 2.0, 0.0, &mut gcode);

        assert_eq!(gcode.len(), (RAFT_PASSES * 4) as usize);
        assert_eq!(fed, 2.0 * 60.0);
        let lines: Vec<String> = gcode.iter().map(ToString::to_string).collect();
        assert_eq!(lines[0], "G1 X60.000 E2.00000 F900.00");
        assert_eq!(lines[1], "G0 Y1.000 F9000.00");
        assert_eq!(lines[2], "G1 X-60.000 E2.00000 F900.00");
        assert_eq!(lines[3], "G0 Y1.000 F9000.00");
    }

    #[test]
    fn test_vertical_layer_strokes_along_y() {
        let config = config();
        let mut gcode = Vec::new();
        raft_layer(&config, StrokeAxis::Y, 1.0, 0.0, &mut gcode);

        let first = gcode[0].as_motion().unwrap();
        assert_eq!(first.y_value(), Some(60.0));
        assert_eq!(first.x_value(), None);
        let step = gcode[1].as_motion().unwrap();
        assert_eq!(step.x_value(), Some(1.0));
    }

    #[test]
    fn test_raft_covers_sixty_mm_each_way() {
        let config = config();
        let mut gcode = Vec::new();
        raft_layer(&config, StrokeAxis::X, 1.0, 0.0, &mut gcode);

        let net_x: f64 = gcode.iter().filter_map(|l| l.as_motion()?.x_value()).sum();
        let net_y: f64 = gcode.iter().filter_map(|l| l.as_motion()?.y_value()).sum();
        assert_eq!(net_x, 0.0);
        assert_eq!(net_y, 60.0);
    }

    #[test]
    fn test_generate_raft_positions() {
        let config = config();
        let mut gcode = Vec::new();
        let fed = generate_raft(&config, &mut gcode).unwrap();

        let expected = config.e_value(60.0).unwrap() * 120.0;
        assert!((fed - expected).abs() < 1e-9);

        let lines: Vec<String> = gcode.iter().map(ToString::to_string).collect();
        assert_eq!(lines[3], "G0 X80.000 Y80.000 Z0.200 F9000.00");
        assert_eq!(lines.last().unwrap(), "G0 X85.000 Y85.000 Z0.600 F9000.00");
        assert!(lines.contains(&"G0 X80.000 Y80.000 Z0.400 F9000.00".to_string()));

        let layers: Vec<&String> = lines.iter().filter(|l| l.starts_with(";Layer")).collect();
        assert_eq!(layers, vec![";Layer 1", ";Layer 2"]);
    }

    #[test]
    fn test_generate_raft_propagates_bad_filament() {
        let config = CalibrationConfig {
            filament_diameter: 0.0,
            ..config()
        };
        let mut gcode = Vec::new();
        let err = generate_raft(&config, &mut gcode).unwrap_err();
        assert_eq!(err.field(), "filament_diameter");
        assert!(gcode.is_empty());
    }
}
