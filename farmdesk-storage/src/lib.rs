//! Write-through storage for farmdesk.
//!
//! Every collection lives in memory and is written whole to a durable
//! key-value store after each change, so the last in-memory state is
//! always the last persisted state.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] abstracts the durable backend (SQLite file or memory)
//! - [`Collection`] keeps one record kind and its storage key in step
//! - [`FarmStore`] owns the four collections and produces snapshots
//! - [`SyncConfigStore`] and [`SessionFlag`] hold the remaining keys
//!
//! Storage keys: `harvests`, `workRecords`, `orders`, `expenses`,
//! `syncConfig`, `isLoggedIn`.

mod collection;
mod error;
mod farm_store;
pub mod keys;
mod kv;
mod seed;
mod session_flag;
mod sync_config_store;

pub use collection::Collection;
pub use error::{StorageError, StorageResult};
pub use farm_store::{FarmRecord, FarmStore};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use seed::seed_orders;
pub use session_flag::SessionFlag;
pub use sync_config_store::SyncConfigStore;
