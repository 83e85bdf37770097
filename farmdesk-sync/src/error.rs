//! Error types for the sync layer.

use farmdesk_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No replication endpoint is configured.
    #[error("no replication endpoint configured")]
    NoEndpoint,

    /// The configured endpoint is not a usable HTTP(S) URL.
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Network error (unreachable host, timeout, connection reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Recording the sync time failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
