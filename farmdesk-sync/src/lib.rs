//! Best-effort replication of the farm ledger.
//!
//! A [`ReplicationScheduler`] periodically decides whether a push is due
//! and, if so, hands a [`FarmSnapshot`](farmdesk_types::FarmSnapshot) to a
//! [`ReplicationTransport`]. Replication is a point-in-time mirror: local
//! data stays authoritative and a failed push is simply tried again at the
//! next check.
//!
//! # Architecture
//!
//! - [`schedule`]: the due-ness rule and [`SchedulePolicy`]
//! - [`ReplicationTransport`]: one-shot delivery; [`HttpTransport`] posts JSON
//! - [`SnapshotSource`] / [`SyncStateStore`]: the scheduler's view of the stores
//! - [`ReplicationScheduler::spawn`]: cancellable background loop

mod error;
mod http;
pub mod schedule;
mod scheduler;
mod sources;
mod transport;

pub use error::{SyncError, SyncResult};
pub use http::{HttpTransport, HttpTransportConfig};
pub use schedule::SchedulePolicy;
pub use scheduler::{CheckOutcome, ReplicationScheduler, SchedulerHandle};
pub use sources::{SnapshotSource, SyncStateStore};
pub use transport::ReplicationTransport;
