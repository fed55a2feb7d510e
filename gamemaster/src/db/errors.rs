//! Storage error types.

use thiserror::Error;

/// Repository errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data violates an invariant
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for repository operations
pub type StorageResult<T> = Result<T, StorageError>;
