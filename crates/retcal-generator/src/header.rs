//! Program header
//!
//! Human-readable documentation emitted as comments at the top of the
//! program: a top-down diagram of where each retraction distance lands on
//! the tower, the per-section variables, and a dump of every input.

use retcal_core::{CalibrationConfig, GcodeLine, SUB_TESTS_PER_SQUARE};

/// Title written on the first line of every program
pub fn title() -> String {
    format!(
        "Retraction Calibration Generator {}",
        env!("CARGO_PKG_VERSION")
    )
}

/// Top-down box diagram of the sixteen retraction distances.
///
/// Indices 0-3 run along the bottom edge, 4-7 up the right edge, 8-11 back
/// along the top and 12-15 down the left edge, matching the order in which
/// the tower traces its square.
pub fn retraction_distance_diagram(config: &CalibrationConfig) -> Vec<String> {
    let d: Vec<f64> = (0..SUB_TESTS_PER_SQUARE)
        .map(|i| config.retraction_distance(i))
        .collect();

    let row = |indices: [usize; 4]| {
        let values: Vec<String> = indices.iter().map(|&i| format!("{:<6.2}", d[i])).collect();
        format!("{:10}{}", "", values.join("  "))
    };
    let bars = format!("{:10}{}", "", format!("{:<8}", "|").repeat(4));
    let side = |left: usize, right: usize| {
        format!("{:>6.2} -  {:32}- {:<6.2}", d[left], "", d[right])
    };

    let mut lines = vec![
        "Retraction Distance from the top looking down".to_string(),
        String::new(),
        row([11, 10, 9, 8]),
        bars.clone(),
    ];
    let pairs = [(12, 7), (13, 6), (14, 5), (15, 4)];
    for (n, (left, right)) in pairs.into_iter().enumerate() {
        if n > 0 {
            lines.push(String::new());
            lines.push(String::new());
        }
        lines.push(side(left, right));
    }
    lines.push(String::new());
    lines.push(bars);
    lines.push(row([0, 1, 2, 3]));

    strip_trailing(lines)
}

/// Table of the values that change from one section to the next.
pub fn variables_by_height(config: &CalibrationConfig) -> Vec<String> {
    let mut lines = vec![
        "Variables by Height".to_string(),
        String::new(),
        format!("{:<15}{:<12}{:<12}{:<12}", "Num", "Retraction", "Nozzle", "Fan"),
        format!("{:<15}{:<12}{:<12}{:<12}", "Layers", "Speed", "Temp", "Speed"),
        String::new(),
    ];

    for section in 0..config.num_tests {
        lines.push(format!(
            "{:<15}{:<12.2}{:<12.2}{:<12.2}",
            config.layers_per_test,
            config.retraction_speed(section),
            config.hotend_temp(section),
            config.fan_percent(section)
        ));
    }

    strip_trailing(lines)
}

/// `name = value` for every input, so a print can be reproduced from its file.
pub fn all_inputs(config: &CalibrationConfig) -> Vec<String> {
    let mut lines = vec![" All inputs".to_string(), String::new()];
    lines.extend(
        config
            .inputs()
            .into_iter()
            .map(|(name, value)| format!("{} = {}", name, value)),
    );
    strip_trailing(lines)
}

/// Full header as comment lines.
pub fn generate_header(config: &CalibrationConfig) -> Vec<GcodeLine> {
    let blank_pair = || vec![String::new(), String::new()];

    let mut lines = vec![title()];
    lines.extend(blank_pair());
    lines.extend(retraction_distance_diagram(config));
    lines.extend(blank_pair());
    lines.extend(variables_by_height(config));
    lines.extend(blank_pair());
    lines.extend(all_inputs(config));
    lines.extend(blank_pair());

    lines.into_iter().map(GcodeLine::Comment).collect()
}

fn strip_trailing(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}
