//! Form input
//!
//! [`CalibrationForm`] carries the raw text of every input field the way a
//! desktop form collects it. Speeds are entered in mm/s and converted to the
//! mm/min feed rates the generator works in.

use retcal_core::CalibrationConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// Seconds per minute, for mm/s to mm/min conversion
const SECONDS_PER_MINUTE: u32 = 60;

/// Raw text of every calibration input field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationForm {
    pub retraction_dist_init: String,
    pub retraction_dist_delta: String,
    pub retraction_speed_init: String,
    pub retraction_speed_delta: String,
    pub hotend_temp_init: String,
    pub hotend_temp_change: String,
    pub fan_speed_init: String,
    pub fan_speed_delta: String,
    pub layer_height: String,
    pub layers_per_test: String,
    pub num_tests: String,
    pub bed_shape_x: String,
    pub bed_shape_y: String,
    /// Print speed in mm/s
    pub print_speed: String,
    /// Travel speed in mm/s
    pub travel_speed: String,
    pub nozzle_diameter: String,
    pub filament_diameter: String,
    pub extrusion_multiplier: String,
    pub bed_temp: String,
    pub custom_gcode: String,
}

fn invalid(field: &str, reason: String) -> SettingsError {
    SettingsError::InvalidField {
        field: field.to_string(),
        reason,
    }
}

fn parse_float(field: &str, text: &str) -> SettingsResult<f64> {
    let text = text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| invalid(field, format!("'{}' is not a number", text)))?;
    if !value.is_finite() {
        return Err(invalid(field, format!("'{}' is not a finite number", text)));
    }
    Ok(value)
}

fn parse_count(field: &str, text: &str) -> SettingsResult<u32> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(invalid(field, format!("'{}' must not be negative", text)));
    }
    text.parse()
        .map_err(|_| invalid(field, format!("'{}' is not a whole number", text)))
}

fn parse_speed(field: &str, text: &str) -> SettingsResult<u32> {
    parse_count(field, text)?
        .checked_mul(SECONDS_PER_MINUTE)
        .ok_or_else(|| invalid(field, format!("'{}' is too large", text.trim())))
}

impl CalibrationForm {
    /// Fill the form from an existing configuration, speeds back in mm/s
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            retraction_dist_init: config.retraction_dist_init.to_string(),
            retraction_dist_delta: config.retraction_dist_delta.to_string(),
            retraction_speed_init: config.retraction_speed_init.to_string(),
            retraction_speed_delta: config.retraction_speed_delta.to_string(),
            hotend_temp_init: config.hotend_temp_init.to_string(),
            hotend_temp_change: config.hotend_temp_change.to_string(),
            fan_speed_init: config.fan_speed_init.to_string(),
            fan_speed_delta: config.fan_speed_delta.to_string(),
            layer_height: config.layer_height.to_string(),
            layers_per_test: config.layers_per_test.to_string(),
            num_tests: config.num_tests.to_string(),
            bed_shape_x: config.bed_shape_x.to_string(),
            bed_shape_y: config.bed_shape_y.to_string(),
            print_speed: (config.print_speed / SECONDS_PER_MINUTE).to_string(),
            travel_speed: (config.travel_speed / SECONDS_PER_MINUTE).to_string(),
            nozzle_diameter: config.nozzle_diameter.to_string(),
            filament_diameter: config.filament_diameter.to_string(),
            extrusion_multiplier: config.extrusion_multiplier.to_string(),
            bed_temp: config.bed_temp.to_string(),
            custom_gcode: config.custom_gcode.clone(),
        }
    }

    /// Parse every field and validate the result.
    ///
    /// The first field that fails to parse is reported by name.
    pub fn parse(&self) -> SettingsResult<CalibrationConfig> {
        let config = CalibrationConfig {
            retraction_dist_init: parse_float("retraction_dist_init", &self.retraction_dist_init)?,
            retraction_dist_delta: parse_float(
                "retraction_dist_delta",
                &self.retraction_dist_delta,
            )?,
            retraction_speed_init: parse_float(
                "retraction_speed_init",
                &self.retraction_speed_init,
            )?,
            retraction_speed_delta: parse_float(
                "retraction_speed_delta",
                &self.retraction_speed_delta,
            )?,
            hotend_temp_init: parse_float("hotend_temp_init", &self.hotend_temp_init)?,
            hotend_temp_change: parse_float("hotend_temp_change", &self.hotend_temp_change)?,
            fan_speed_init: parse_float("fan_speed_init", &self.fan_speed_init)?,
            fan_speed_delta: parse_float("fan_speed_delta", &self.fan_speed_delta)?,
            layer_height: parse_float("layer_height", &self.layer_height)?,
            layers_per_test: parse_count("layers_per_test", &self.layers_per_test)?,
            num_tests: parse_count("num_tests", &self.num_tests)?,
            bed_shape_x: parse_float("bed_shape_x", &self.bed_shape_x)?,
            bed_shape_y: parse_float("bed_shape_y", &self.bed_shape_y)?,
            print_speed: parse_speed("print_speed", &self.print_speed)?,
            travel_speed: parse_speed("travel_speed", &self.travel_speed)?,
            nozzle_diameter: parse_float("nozzle_diameter", &self.nozzle_diameter)?,
            filament_diameter: parse_float("filament_diameter", &self.filament_diameter)?,
            extrusion_multiplier: parse_float("extrusion_multiplier", &self.extrusion_multiplier)?,
            bed_temp: parse_float("bed_temp", &self.bed_temp)?,
            custom_gcode: self.custom_gcode.clone(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_defaults() {
        let config = CalibrationConfig::default();
        let parsed = CalibrationForm::from_config(&config).parse().unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_speeds_convert_to_mm_per_min() {
        let mut form = CalibrationForm::from_config(&CalibrationConfig::default());
        form.print_speed = " 40 ".to_string();
        form.travel_speed = "120".to_string();
        let config = form.parse().unwrap();
        assert_eq!(config.print_speed, 2400);
        assert_eq!(config.travel_speed, 7200);
    }

    #[test]
    fn test_bad_number_names_field() {
        let mut form = CalibrationForm::from_config(&CalibrationConfig::default());
        form.layer_height = "0,2".to_string();
        let err = form.parse().unwrap_err();
        assert_eq!(err.field(), Some("layer_height"));
        assert_eq!(
            err.to_string(),
            "Invalid value for 'layer_height': '0,2' is not a number"
        );
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut form = CalibrationForm::from_config(&CalibrationConfig::default());
        form.num_tests = "-2".to_string();
        let err = form.parse().unwrap_err();
        assert_eq!(err.field(), Some("num_tests"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut form = CalibrationForm::from_config(&CalibrationConfig::default());
        form.bed_temp = "inf".to_string();
        assert_eq!(form.parse().unwrap_err().field(), Some("bed_temp"));
    }

    #[test]
    fn test_validation_runs_after_parsing() {
        let mut form = CalibrationForm::from_config(&CalibrationConfig::default());
        form.filament_diameter = "0".to_string();
        let err = form.parse().unwrap_err();
        assert!(matches!(err, SettingsError::Parameter(_)));
        assert_eq!(err.field(), Some("filament_diameter"));
    }

    #[test]
    fn test_empty_form_fails_on_first_field() {
        let err = CalibrationForm::default().parse().unwrap_err();
        assert_eq!(err.field(), Some("retraction_dist_init"));
    }
}
