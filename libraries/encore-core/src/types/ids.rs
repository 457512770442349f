//! ID types for Encore entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Advertisement identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(String);

impl AdId {
    /// Create a new advertisement ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random advertisement ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AdId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AdId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
