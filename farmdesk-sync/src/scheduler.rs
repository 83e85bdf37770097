//! The replication scheduler and its background task.
//!
//! The task wakes every [`SchedulePolicy::check_interval`] (the first wake
//! is immediate), checks due-ness, and pushes a snapshot when due.
//! Failures are logged and left for the next wake; nothing escapes the
//! task. Stopping the task never aborts an attempt already in flight.

use crate::error::{SyncError, SyncResult};
use crate::schedule::SchedulePolicy;
use crate::sources::{SnapshotSource, SyncStateStore};
use crate::transport::ReplicationTransport;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Result of one scheduled check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No endpoint is configured.
    Disabled,
    /// The last sync is recent enough.
    NotDue { next_due: Option<DateTime<Utc>> },
    /// The snapshot was sent and `lastSync` set to `at`.
    Replicated { at: DateTime<Utc> },
    /// The attempt failed; `lastSync` is unchanged.
    Failed { reason: String },
}

/// Decides when to replicate and drives the transport.
pub struct ReplicationScheduler {
    snapshots: Arc<dyn SnapshotSource>,
    state: Arc<dyn SyncStateStore>,
    transport: Arc<dyn ReplicationTransport>,
    policy: SchedulePolicy,
}

impl ReplicationScheduler {
    pub fn new(
        snapshots: Arc<dyn SnapshotSource>,
        state: Arc<dyn SyncStateStore>,
        transport: Arc<dyn ReplicationTransport>,
        policy: SchedulePolicy,
    ) -> Self {
        Self {
            snapshots,
            state,
            transport,
            policy,
        }
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// Runs one check: replicate if an endpoint is set and a sync is due.
    pub async fn check(&self) -> CheckOutcome {
        let config = self.state.sync_config();
        let Some(endpoint) = config.endpoint() else {
            debug!("replication disabled, no endpoint");
            return CheckOutcome::Disabled;
        };

        let now = Utc::now();
        if !self.policy.is_due(config.last_sync, now) {
            let next_due = self.policy.next_due(config.last_sync, now);
            debug!(last_sync = ?config.last_sync, ?next_due, "replication not due");
            return CheckOutcome::NotDue { next_due };
        }

        match self.replicate(endpoint).await {
            Ok(at) => CheckOutcome::Replicated { at },
            Err(e) => {
                warn!(error = %e, "replication attempt failed, will retry at next check");
                CheckOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Replicates immediately regardless of due-ness, returning any error
    /// to the caller.
    pub async fn sync_now(&self) -> SyncResult<DateTime<Utc>> {
        let config = self.state.sync_config();
        let endpoint = config.endpoint().ok_or(SyncError::NoEndpoint)?;
        self.replicate(endpoint).await
    }

    async fn replicate(&self, endpoint: &str) -> SyncResult<DateTime<Utc>> {
        let snapshot = self.snapshots.snapshot();
        let records = snapshot.record_count();
        self.transport.replicate(endpoint, &snapshot).await?;

        let at = Utc::now();
        self.state.record_sync(at)?;
        info!(records, %at, "snapshot replicated");
        Ok(at)
    }

    /// Starts the periodic check loop on the current tokio runtime.
    ///
    /// The loop runs until [`SchedulerHandle::shutdown`] is called or the
    /// handle is dropped.
    pub fn spawn(self) -> SchedulerHandle {
        let cancel = CancellationToken::new();
        let (outcomes_tx, outcomes_rx) = watch::channel(None);
        let task = tokio::spawn(self.run(cancel.child_token(), outcomes_tx));

        SchedulerHandle {
            task,
            outcomes: outcomes_rx,
            cancel: cancel.clone(),
            _cancel_loop: cancel.drop_guard(),
        }
    }

    async fn run(self, cancel: CancellationToken, outcomes: watch::Sender<Option<CheckOutcome>>) {
        let period = self.policy.check_interval.max(Duration::from_secs(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(check_every = ?period, due_after = ?self.policy.due_after, "replication scheduler started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let outcome = self.check().await;
                    outcomes.send_replace(Some(outcome));
                }
            }
        }

        info!("replication scheduler stopped");
    }
}

/// Owns the running check loop. Dropping the handle stops the loop.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
    outcomes: watch::Receiver<Option<CheckOutcome>>,
    cancel: CancellationToken,
    _cancel_loop: DropGuard,
}

impl SchedulerHandle {
    /// Outcome of the most recent check, `None` before the first.
    pub fn outcomes(&self) -> watch::Receiver<Option<CheckOutcome>> {
        self.outcomes.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the loop and waits for it to exit. An attempt in flight is
    /// allowed to finish first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "replication scheduler task ended abnormally");
        }
    }
}
