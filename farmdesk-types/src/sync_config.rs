//! Replication endpoint and last-sync bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Endpoint used when nothing else has been configured.
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbxkZS-XpGxt6ibS9mVXv_h461nPRZw8r6j-0jDJaaYW7X1LkHkUTUFAt7S17fM7nBCw/exec";

/// The singleton sync configuration record.
///
/// `endpoint_url` is stored under the `googleSheetUrl` key for
/// compatibility with existing data; `endpointUrl` is accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(rename = "googleSheetUrl", alias = "endpointUrl", default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl SyncConfig {
    /// The endpoint, if one is set and non-blank.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Merges the fields present in `patch`.
    pub fn apply(&mut self, patch: SyncConfigPatch) {
        if let Some(endpoint) = patch.endpoint_url {
            self.endpoint_url = endpoint;
        }
        if let Some(last_sync) = patch.last_sync {
            self.last_sync = last_sync;
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint_url: Some(DEFAULT_ENDPOINT_URL.to_string()),
            last_sync: None,
        }
    }
}

/// Partial update of a [`SyncConfig`]. The outer `Option` means "leave
/// unchanged"; the inner one allows clearing the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfigPatch {
    pub endpoint_url: Option<Option<String>>,
    pub last_sync: Option<Option<DateTime<Utc>>>,
}

impl SyncConfigPatch {
    pub fn endpoint(url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    pub fn clear_endpoint() -> Self {
        Self {
            endpoint_url: Some(None),
            ..Self::default()
        }
    }

    pub fn synced_at(at: DateTime<Utc>) -> Self {
        Self {
            last_sync: Some(Some(at)),
            ..Self::default()
        }
    }
}
