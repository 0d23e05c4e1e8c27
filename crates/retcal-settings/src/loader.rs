//! Configuration files
//!
//! Loads a [`CalibrationConfig`] from JSON or TOML. The format is chosen by
//! file extension and missing keys fall back to their defaults.

use std::path::Path;

use retcal_core::CalibrationConfig;
use tracing::debug;

use crate::error::{ConfigError, SettingsResult};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Parse and validate a configuration from text
pub fn parse_config(content: &str, format: ConfigFormat) -> SettingsResult<CalibrationConfig> {
    if content.trim().is_empty() {
        return Err(ConfigError::Empty(format!("{:?} input", format)).into());
    }

    let config: CalibrationConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };

    config.validate()?;
    Ok(config)
}

/// Load and validate a configuration file (`.json` or `.toml`)
pub fn load_config(path: &Path) -> SettingsResult<CalibrationConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content, format)?;
    debug!(path = %path.display(), ?format, "Loaded calibration config");
    Ok(config)
}
