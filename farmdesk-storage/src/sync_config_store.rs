//! The Sync Configuration singleton.

use crate::error::StorageResult;
use crate::keys;
use crate::kv::KeyValueStore;
use farmdesk_types::{SyncConfig, SyncConfigPatch, DEFAULT_ENDPOINT_URL};
use std::sync::Arc;
use tracing::{debug, warn};

/// Replication endpoint and last-sync time, persisted under `syncConfig`.
pub struct SyncConfigStore {
    config: SyncConfig,
    kv: Arc<dyn KeyValueStore>,
}

impl SyncConfigStore {
    /// Loads the configuration.
    ///
    /// Absent or malformed data yields the default. A stored blank
    /// endpoint is replaced with [`DEFAULT_ENDPOINT_URL`].
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut config = match kv.get(keys::SYNC_CONFIG) {
            Ok(Some(json)) => serde_json::from_str::<SyncConfig>(&json).unwrap_or_else(|e| {
                warn!(error = %e, "stored sync config is malformed, using default");
                SyncConfig::default()
            }),
            Ok(None) => SyncConfig::default(),
            Err(e) => {
                warn!(error = %e, "failed to read sync config, using default");
                SyncConfig::default()
            }
        };
        if config.endpoint().is_none() {
            config.endpoint_url = Some(DEFAULT_ENDPOINT_URL.to_string());
        }
        Self { config, kv }
    }

    pub fn get(&self) -> &SyncConfig {
        &self.config
    }

    /// Merges `patch` and persists. On a write failure the in-memory
    /// configuration is unchanged.
    pub fn set(&mut self, patch: SyncConfigPatch) -> StorageResult<&SyncConfig> {
        let mut next = self.config.clone();
        next.apply(patch);
        let json = serde_json::to_string(&next)?;
        self.kv.put(keys::SYNC_CONFIG, &json)?;
        debug!(
            endpoint = next.endpoint().unwrap_or("<none>"),
            last_sync = ?next.last_sync,
            "sync config saved"
        );
        self.config = next;
        Ok(&self.config)
    }
}
