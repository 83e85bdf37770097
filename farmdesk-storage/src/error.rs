//! Error types for the storage layer.

use farmdesk_types::ValidationError;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record failed its invariants and was not stored.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    /// The backend refused a write.
    #[error("write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}
