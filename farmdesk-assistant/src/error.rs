//! Assistant error types.

use thiserror::Error;

/// Result type for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Errors that can occur while asking the assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AssistantError {
    /// Returns true for a 429 response.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AssistantError::Api { status, .. } => *status == 429,
            AssistantError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 429),
            _ => false,
        }
    }
}
