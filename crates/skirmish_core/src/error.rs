//! Error types for the skirmish simulation.
//!
//! The per-tick path never fails: degenerate geometry, empty rosters and
//! inconsistent objective actions resolve to defined fallbacks. Errors only
//! surface at construction and file boundaries.

use thiserror::Error;

use crate::agent::AgentId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file parsing error.
    #[error("Failed to parse config file '{path}': {message}")]
    ConfigParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Filesystem failure while reading or writing a config or replay.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary encoding or decoding failure.
    #[error("Failed to encode or decode replay: {0}")]
    Encoding(#[from] bincode::Error),

    /// Replay was written by an incompatible format version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version stored in the file.
        found: u32,
    },

    /// No live agent carries this identifier.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}
