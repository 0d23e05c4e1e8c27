//! # RetCal Core
//!
//! Core types for the retraction calibration generator: the calibration
//! parameters and the extrusion math derived from them, the G-code command
//! model, and the error types shared by the other crates.

pub mod config;
pub mod error;
pub mod gcode;

pub use config::{CalibrationConfig, RAFT_HALF_SIZE, SUB_TESTS_PER_SQUARE};
pub use error::{CalibrationError, CalibrationResult, ParameterError, ParameterResult};
pub use gcode::{GcodeLine, MotionCommand, MotionKind};
