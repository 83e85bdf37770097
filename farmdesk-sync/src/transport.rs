//! Transport layer abstraction.
//!
//! A replication transport delivers one snapshot to one endpoint in a
//! single request. It never retries, queues or buffers; a failed payload
//! is simply superseded by the next snapshot.

use crate::error::SyncResult;
use async_trait::async_trait;
use farmdesk_types::FarmSnapshot;

/// Pushes a full snapshot to a replication endpoint.
#[async_trait]
pub trait ReplicationTransport: Send + Sync {
    /// Sends `snapshot` to `endpoint`.
    ///
    /// `Ok` means the request was dispatched without a transport-level
    /// error. The response body is not interpreted.
    async fn replicate(&self, endpoint: &str, snapshot: &FarmSnapshot) -> SyncResult<()>;
}
