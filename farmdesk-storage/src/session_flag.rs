//! The persisted logged-in flag.

use crate::error::StorageResult;
use crate::keys;
use crate::kv::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

const LOGGED_IN: &str = "true";

/// Whether a session survives restarts, stored as `isLoggedIn = "true"`.
#[derive(Clone)]
pub struct SessionFlag {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionFlag {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// An unreadable flag counts as logged out.
    pub fn is_set(&self) -> bool {
        match self.kv.get(keys::IS_LOGGED_IN) {
            Ok(value) => value.as_deref() == Some(LOGGED_IN),
            Err(e) => {
                warn!(error = %e, "failed to read session flag");
                false
            }
        }
    }

    pub fn set(&self) -> StorageResult<()> {
        self.kv.put(keys::IS_LOGGED_IN, LOGGED_IN)
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.kv.delete(keys::IS_LOGGED_IN)
    }
}
