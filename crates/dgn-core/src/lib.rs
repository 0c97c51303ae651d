//! dgn-core: Deterministic room-and-corridor level generator
//!
//! Levels are built from a seed and a depth. All randomness flows through a
//! single ISAAC64 stream so a level can be regenerated exactly, and the
//! stream can be logged draw by draw for comparison against a reference.

pub mod consts;
pub mod dungeon;
pub mod error;
pub mod options;

pub use consts::{COLNO, ROWNO};
pub use dungeon::{Level, generate_level, generate_level_with};
pub use error::{ConfigError, InvariantViolation, LevelError};
pub use options::GenOptions;
