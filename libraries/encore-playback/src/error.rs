//! Error types for playback management

use encore_core::EncoreError;
use thiserror::Error;

/// Playback errors
///
/// Only caller mistakes surface as `Err`. Media failures are recorded in the
/// session's `error` field instead.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid seek position
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Core error
    #[error(transparent)]
    Core(#[from] EncoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
