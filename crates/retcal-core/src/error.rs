//! Error types for the calibration core.
//!
//! This module provides structured error types for configuration validation,
//! extrusion math and program generation.

use std::io;
use thiserror::Error;

/// Errors that can occur while generating a calibration program.
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// I/O error while writing the generated program.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// Errors related to calibration parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// A parameter is NaN or infinite.
    #[error("Parameter '{name}' must be a finite number")]
    NonFinite { name: String },
}

impl ParameterError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidValue { name, .. } => name,
            Self::NonFinite { name } => name,
        }
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
