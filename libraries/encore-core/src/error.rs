//! Core error types for Encore

use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Core error type for Encore
#[derive(Error, Debug)]
pub enum EncoreError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An advertisement catalog must hold at least one descriptor
    #[error("Advertisement catalog is empty")]
    EmptyCatalog,

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl EncoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
