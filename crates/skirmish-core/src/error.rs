//! Error types for loading configuration and level data.
//!
//! Nothing inside a simulation tick is fallible; these cover the entry
//! points that parse or validate external input.

use thiserror::Error;

use crate::types::BodyHandle;

/// Level geometry errors.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Malformed level document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Level size must be positive, got {width} x {height}")]
    InvalidSize { width: f32, height: f32 },

    #[error("Level is missing required layer: {0}")]
    MissingLayer(String),
}

/// Simulation configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wave table must contain at least one hostile")]
    EmptyWaveTable,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Physics arena errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("Body not found: {0:?}")]
    BodyNotFound(BodyHandle),

    #[error("Stale body handle: {0:?}")]
    StaleHandle(BodyHandle),
}

/// Result type for physics operations
pub type PhysicsResult<T> = std::result::Result<T, PhysicsError>;
