//! # RetCal
//!
//! Generates G-code for a retraction calibration tower: a raft followed by
//! a stack of 10 x 10 mm squares whose sides test sixteen retraction
//! distances, with retraction speed, hotend temperature and fan speed
//! stepping from one section of the tower to the next.
//!
//! ## Architecture
//!
//! RetCal is organized as a workspace with multiple crates:
//!
//! 1. **retcal-core** - Calibration parameters, extrusion math, G-code command model, errors
//! 2. **retcal-generator** - Header, raft, tower and program assembly
//! 3. **retcal-settings** - Config file loading and form parsing
//! 4. **retcal** - Main binary that integrates all crates

use std::path::Path;

pub use retcal_core::{
    CalibrationConfig, CalibrationError, CalibrationResult, GcodeLine, MotionCommand, MotionKind,
    ParameterError,
};
pub use retcal_generator::{generate, CalibrationGenerator, CalibrationProgram};
pub use retcal_settings::{load_config, CalibrationForm, ConfigFormat, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Load a config file, generate its program and write it to `output`.
///
/// Nothing is written if loading or generation fails.
pub fn run(config_path: &Path, output: &Path) -> anyhow::Result<CalibrationProgram> {
    use anyhow::Context;

    let config = load_config(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let program = CalibrationGenerator::new(config).generate()?;
    program
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(program)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_run_writes_program_for_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("retcal.toml");
        let output = dir.path().join("retraction.gcode");
        fs::write(&config_path, "num_tests = 2\nlayers_per_test = 3\n").unwrap();

        let program = run(&config_path, &output).unwrap();
        assert_eq!(program.layer_count(), 2 * 3 + 2);

        let expected = CalibrationGenerator::new(CalibrationConfig {
            num_tests: 2,
            layers_per_test: 3,
            ..Default::default()
        })
        .generate()
        .unwrap()
        .to_gcode();
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
    }

    #[test]
    fn test_run_writes_nothing_on_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("retcal.json");
        let output = dir.path().join("retraction.gcode");
        fs::write(&config_path, r#"{ "filament_diameter": 0 }"#).unwrap();

        let err = run(&config_path, &output).unwrap_err();
        assert!(format!("{:#}", err).contains("filament_diameter"));
        assert!(!output.exists());
    }
}
