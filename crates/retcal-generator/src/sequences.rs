//! Start and end of print sequences

use retcal_core::{CalibrationConfig, GcodeLine, MotionCommand};

/// Filament pushed through the nozzle before the raft (mm).
pub const PRIME_LENGTH: f64 = 1.0;
/// Feed rate for the prime (mm/min).
pub const PRIME_FEEDRATE: f64 = 200.0;
/// Z lift at the end of the print (mm, relative).
pub const END_LIFT: f64 = 5.0;

/// Heat up, home, prime the nozzle and append the user's custom G-code.
///
/// Blank custom G-code adds nothing; otherwise every line of it is emitted
/// verbatim as its own command.
pub fn start_sequence(config: &CalibrationConfig) -> Vec<GcodeLine> {
    let mut gcode = vec![
        GcodeLine::comment(" Start Gcode"),
        GcodeLine::set_bed_temp(config.bed_temp),
        GcodeLine::report_temps(),
        GcodeLine::wait_bed_temp(config.bed_temp),
        GcodeLine::set_hotend_temp(config.hotend_temp_init),
        GcodeLine::report_temps(),
        GcodeLine::wait_hotend_temp(config.hotend_temp_init),
        GcodeLine::absolute_extrusion(),
        GcodeLine::home_all(),
        GcodeLine::reset_extruder(),
        MotionCommand::linear()
            .e_distance(PRIME_LENGTH)
            .f(PRIME_FEEDRATE)
            .into(),
        GcodeLine::reset_extruder(),
    ];

    gcode.extend(
        config
            .custom_gcode
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(GcodeLine::raw),
    );

    gcode.push(GcodeLine::comment(""));
    gcode.push(GcodeLine::comment(""));
    gcode
}

/// Lift, home X/Y, and switch off motors, fan and heaters.
pub fn end_sequence() -> Vec<GcodeLine> {
    vec![
        MotionCommand::linear().z(END_LIFT).into(),
        GcodeLine::absolute_positioning(),
        GcodeLine::home_xy(),
        GcodeLine::disable_steppers(),
        GcodeLine::fan_off(),
        GcodeLine::set_hotend_temp(0.0),
        GcodeLine::set_bed_temp(0.0),
    ]
}
