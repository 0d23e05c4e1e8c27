//! RetCal Settings Crate
//!
//! Turns user input into a validated [`CalibrationConfig`], either from a
//! configuration file or from the raw text fields of an input form.

pub mod error;
pub mod form;
pub mod loader;

pub use error::{ConfigError, SettingsError, SettingsResult};
pub use form::CalibrationForm;
pub use loader::{load_config, parse_config, ConfigFormat};
pub use retcal_core::CalibrationConfig;
