//! Error types for the store module.

use revocation_registry_core::{CoreError, Timestamp};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The fact could not be digested. Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The backend could not be reached (poisoned lock, lost worker thread).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Encoding a column value failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store options are unusable.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The watermark moved backwards. Continuing could skip records.
    #[error("watermark moved backwards from {previous} to {current}")]
    WatermarkViolation {
        previous: Timestamp,
        current: Timestamp,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether a caller may retry the operation with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_) | StoreError::Unavailable(_) | StoreError::Io(_)
        )
    }

    /// Whether the error was caused by the request rather than the store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StoreError::InvalidInput(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
