//! Error types used throughout the date-range crates

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for date-range operations
///
/// Evaluation is total and never fails; only configuration checks and the
/// storage collaborator produce errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum DateRangeError {
    /// Field descriptors or the child relationship are missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The storage collaborator failed; passed through uninterpreted.
    #[error("Persistence error: {message}")]
    Persistence {
        /// Human-readable cause reported by the storage layer.
        message: String,
        /// Whether the storage layer reported a transient condition.
        retryable: bool,
    },

    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied an unusable value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invariant violation or join failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DateRangeError {
    /// Permanent persistence failure.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence { message: message.into(), retryable: false }
    }

    /// Transient persistence failure (busy / locked storage).
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Persistence { message: message.into(), retryable: true }
    }

    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence { retryable: true, .. })
    }
}

/// Result type alias for date-range operations
pub type Result<T> = std::result::Result<T, DateRangeError>;
