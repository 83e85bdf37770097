//! What the scheduler reads from and writes to.
//!
//! The scheduler only ever takes snapshots by value and records one
//! timestamp, so these traits are all it needs from the stores. Locks are
//! held for the duration of a call and never across an await.

use crate::error::SyncResult;
use chrono::{DateTime, Utc};
use farmdesk_storage::{FarmStore, SyncConfigStore};
use farmdesk_types::{FarmSnapshot, SyncConfig, SyncConfigPatch};
use std::sync::{Mutex, PoisonError, RwLock};

/// Produces point-in-time copies of every record collection.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> FarmSnapshot;
}

/// Holds the endpoint and the last successful sync time.
pub trait SyncStateStore: Send + Sync {
    fn sync_config(&self) -> SyncConfig;

    /// Persists `at` as the last successful sync time.
    fn record_sync(&self, at: DateTime<Utc>) -> SyncResult<()>;
}

impl SnapshotSource for RwLock<FarmStore> {
    fn snapshot(&self) -> FarmSnapshot {
        self.read().unwrap_or_else(PoisonError::into_inner).snapshot()
    }
}

impl SyncStateStore for Mutex<SyncConfigStore> {
    fn sync_config(&self) -> SyncConfig {
        self.lock().unwrap_or_else(PoisonError::into_inner).get().clone()
    }

    fn record_sync(&self, at: DateTime<Utc>) -> SyncResult<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(SyncConfigPatch::synced_at(at))?;
        Ok(())
    }
}
