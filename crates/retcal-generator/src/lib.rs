//! # RetCal Generator
//!
//! Builds retraction calibration programs from a [`CalibrationConfig`].
//!
//! ## Program layout
//!
//! - **Header**: retraction distance diagram, variables by height, all inputs
//! - **Start sequence**: heat up, home, prime, custom G-code
//! - **Raft**: two crosshatched 60 x 60 mm layers
//! - **Tower**: one section per test, sixteen retraction segments per layer
//! - **End sequence**: lift, home, motors, fan and heaters off
//!
//! ```ignore
//! use retcal_generator::CalibrationGenerator;
//!
//! let program = CalibrationGenerator::new(config).generate()?;
//! program.save(Path::new("retraction.gcode"))?;
//! ```

pub mod header;
pub mod program;
pub mod raft;
pub mod sequences;
pub mod tower;

pub use program::{generate, CalibrationGenerator, CalibrationProgram};
pub use raft::{generate_raft, StrokeAxis};
pub use retcal_core::CalibrationConfig;
pub use tower::{Side, TowerGenerator, FIRST_TOWER_LAYER};
