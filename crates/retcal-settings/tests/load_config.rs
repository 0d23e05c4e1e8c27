use std::fs;

use retcal_settings::{load_config, CalibrationConfig, ConfigError, SettingsError};

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retcal.toml");
    fs::write(
        &path,
        r#"
retraction_dist_init = 0.5
retraction_dist_delta = 0.1
num_tests = 6
layers_per_test = 8
print_speed = 2400
custom_gcode = """
M900 K0.04
M221 S98
"""
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.retraction_dist_init, 0.5);
    assert_eq!(config.num_tests, 6);
    assert_eq!(config.print_speed, 2400);
    assert_eq!(config.custom_gcode.lines().count(), 2);
    assert_eq!(config.travel_speed, CalibrationConfig::default().travel_speed);
}

#[test]
fn test_load_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retcal.json");
    let expected = CalibrationConfig {
        hotend_temp_init: 230.0,
        hotend_temp_change: -5.0,
        fan_speed_init: 40.0,
        ..Default::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&expected).unwrap()).unwrap();

    assert_eq!(load_config(&path).unwrap(), expected);
}

#[test]
fn test_unknown_extension_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retcal.ini");

    let err = load_config(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::IoError(_)));
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retcal.toml");
    fs::write(&path, "layer_height = 0.0\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert_eq!(err.field(), Some("layer_height"));
}
