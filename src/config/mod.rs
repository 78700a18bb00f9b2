//! Game configuration.
//!
//! The puzzle set and blur schedule are fixed for the lifetime of a
//! controller and passed in explicitly at construction. They can be built
//! in code or loaded from a TOML file.

mod file;
mod puzzle;
mod schedule;

pub use file::{BlurConfig, FileConfig, PathsConfig};
pub use puzzle::{Puzzle, PuzzleSet};
pub use schedule::BlurSchedule;

use serde::{Deserialize, Serialize};

/// Immutable configuration shared by every session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub puzzles: PuzzleSet,
    pub schedule: BlurSchedule,
}

impl GameConfig {
    pub fn new(puzzles: PuzzleSet, schedule: BlurSchedule) -> Self {
        Self { puzzles, schedule }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("blur schedule is empty")]
    EmptySchedule,
    #[error("blur intensities must be at least 1")]
    InvalidIntensity,
    #[error("blur schedule must be strictly decreasing: {0:?}")]
    ScheduleNotDecreasing(Vec<u32>),
    #[error("image listed more than once: {0}")]
    DuplicatePuzzle(String),
    #[error("blank answer for image {0}")]
    BlankAnswer(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
