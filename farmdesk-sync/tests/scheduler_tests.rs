use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use farmdesk_storage::{FarmStore, MemoryKvStore, SyncConfigStore};
use farmdesk_sync::{
    CheckOutcome, ReplicationScheduler, ReplicationTransport, SchedulePolicy, SyncError,
    SyncResult, SyncStateStore,
};
use farmdesk_types::{FarmSnapshot, SyncConfigPatch, DEFAULT_ENDPOINT_URL};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Notify;

/// Records every push; rejects each endpoint when `fail` is set.
#[derive(Default)]
struct FakeTransport {
    fail: bool,
    calls: AtomicUsize,
    last: Mutex<Option<(String, FarmSnapshot)>>,
}

impl FakeTransport {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplicationTransport for FakeTransport {
    async fn replicate(&self, endpoint: &str, snapshot: &FarmSnapshot) -> SyncResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((endpoint.to_string(), snapshot.clone()));
        if self.fail {
            return Err(SyncError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: "refused by the test transport".into(),
            });
        }
        Ok(())
    }
}

/// Blocks inside `replicate` until released.
struct GatedTransport {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ReplicationTransport for GatedTransport {
    async fn replicate(&self, _endpoint: &str, _snapshot: &FarmSnapshot) -> SyncResult<()> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct Fixture {
    kv: Arc<MemoryKvStore>,
    store: Arc<RwLock<FarmStore>>,
    config: Arc<Mutex<SyncConfigStore>>,
}

impl Fixture {
    fn new() -> Self {
        let kv = Arc::new(MemoryKvStore::new());
        Self {
            store: Arc::new(RwLock::new(FarmStore::open(kv.clone()))),
            config: Arc::new(Mutex::new(SyncConfigStore::open(kv.clone()))),
            kv,
        }
    }

    fn scheduler(&self, transport: Arc<dyn ReplicationTransport>) -> ReplicationScheduler {
        ReplicationScheduler::new(
            self.store.clone(),
            self.config.clone(),
            transport,
            SchedulePolicy::default(),
        )
    }

    fn set(&self, patch: SyncConfigPatch) {
        self.config.lock().unwrap().set(patch).unwrap();
    }

    fn last_sync(&self) -> Option<chrono::DateTime<Utc>> {
        self.config.sync_config().last_sync
    }
}

// ── Single checks ───────────────────────────────────────────────

#[tokio::test]
async fn first_check_is_due_and_sends_snapshot() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::default());
    let started = Utc::now();

    let outcome = fx.scheduler(transport.clone()).check().await;

    let CheckOutcome::Replicated { at } = outcome else {
        panic!("expected replication, got {outcome:?}");
    };
    assert!(at >= started);
    assert_eq!(fx.last_sync(), Some(at));
    assert_eq!(transport.calls(), 1);

    let (endpoint, snapshot) = transport.last.lock().unwrap().clone().unwrap();
    assert_eq!(endpoint, DEFAULT_ENDPOINT_URL);
    assert_eq!(snapshot, fx.store.read().unwrap().snapshot());
}

#[tokio::test]
async fn failed_transport_leaves_last_sync_unchanged() {
    let fx = Fixture::new();
    let earlier = Utc::now() - TimeDelta::hours(3);
    fx.set(SyncConfigPatch::synced_at(earlier));
    let transport = Arc::new(FakeTransport::failing());

    let outcome = fx.scheduler(transport.clone()).check().await;

    assert!(matches!(outcome, CheckOutcome::Failed { .. }));
    assert_eq!(fx.last_sync(), Some(earlier));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn recent_sync_is_not_due() {
    let fx = Fixture::new();
    let last = Utc::now() - TimeDelta::minutes(59);
    fx.set(SyncConfigPatch::synced_at(last));
    let transport = Arc::new(FakeTransport::default());

    let outcome = fx.scheduler(transport.clone()).check().await;

    assert_eq!(
        outcome,
        CheckOutcome::NotDue {
            next_due: Some(last + TimeDelta::hours(1))
        }
    );
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn stale_sync_is_due() {
    let fx = Fixture::new();
    fx.set(SyncConfigPatch::synced_at(Utc::now() - TimeDelta::minutes(61)));
    let transport = Arc::new(FakeTransport::default());

    let outcome = fx.scheduler(transport.clone()).check().await;
    assert!(matches!(outcome, CheckOutcome::Replicated { .. }));
}

#[tokio::test]
async fn cleared_endpoint_disables_replication() {
    let fx = Fixture::new();
    fx.set(SyncConfigPatch::clear_endpoint());
    let transport = Arc::new(FakeTransport::default());

    assert_eq!(fx.scheduler(transport.clone()).check().await, CheckOutcome::Disabled);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn endpoint_change_applies_to_next_check() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::default());
    let scheduler = fx.scheduler(transport.clone());

    fx.set(SyncConfigPatch::endpoint("https://sheets.example/new"));
    scheduler.check().await;

    let (endpoint, _) = transport.last.lock().unwrap().clone().unwrap();
    assert_eq!(endpoint, "https://sheets.example/new");
}

#[tokio::test]
async fn failure_to_record_sync_is_reported() {
    let fx = Fixture::new();
    fx.kv.set_read_only(true);
    let transport = Arc::new(FakeTransport::default());

    let outcome = fx.scheduler(transport.clone()).check().await;

    assert!(matches!(outcome, CheckOutcome::Failed { .. }));
    assert_eq!(fx.last_sync(), None);
}

// ── Sync now ────────────────────────────────────────────────────

#[tokio::test]
async fn sync_now_ignores_due_ness() {
    let fx = Fixture::new();
    fx.set(SyncConfigPatch::synced_at(Utc::now()));
    let transport = Arc::new(FakeTransport::default());

    let at = fx.scheduler(transport.clone()).sync_now().await.unwrap();
    assert_eq!(fx.last_sync(), Some(at));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn sync_now_returns_errors() {
    let fx = Fixture::new();
    let failing = Arc::new(FakeTransport::failing());
    assert!(fx.scheduler(failing).sync_now().await.is_err());
    assert_eq!(fx.last_sync(), None);

    fx.set(SyncConfigPatch::clear_endpoint());
    let err = fx
        .scheduler(Arc::new(FakeTransport::default()))
        .sync_now()
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NoEndpoint));
}

// ── Background loop ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn loop_checks_immediately_then_every_interval() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::failing());
    let handle = fx.scheduler(transport.clone()).spawn();
    let mut outcomes = handle.outcomes();

    outcomes.changed().await.unwrap();
    assert!(matches!(*outcomes.borrow(), Some(CheckOutcome::Failed { .. })));
    assert_eq!(transport.calls(), 1);

    // Failures are retried at the next check, not before.
    tokio::time::advance(Duration::from_secs(14 * 60)).await;
    assert_eq!(transport.calls(), 1);

    outcomes.changed().await.unwrap();
    assert_eq!(transport.calls(), 2);

    outcomes.changed().await.unwrap();
    assert_eq!(transport.calls(), 3);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn loop_does_not_repeat_within_the_hour() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::default());
    let handle = fx.scheduler(transport.clone()).spawn();
    let mut outcomes = handle.outcomes();

    outcomes.changed().await.unwrap();
    assert!(matches!(*outcomes.borrow(), Some(CheckOutcome::Replicated { .. })));

    outcomes.changed().await.unwrap();
    assert!(matches!(*outcomes.borrow(), Some(CheckOutcome::NotDue { .. })));
    assert_eq!(transport.calls(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::failing());
    let handle = fx.scheduler(transport.clone()).spawn();
    let mut outcomes = handle.outcomes();
    outcomes.changed().await.unwrap();

    handle.shutdown().await;
    tokio::time::advance(Duration::from_secs(60 * 60)).await;
    assert_eq!(transport.calls(), 1);
    // The sender is gone once the loop has exited.
    assert!(outcomes.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_loop() {
    let fx = Fixture::new();
    let transport = Arc::new(FakeTransport::failing());
    let handle = fx.scheduler(transport.clone()).spawn();
    let mut outcomes = handle.outcomes();
    outcomes.changed().await.unwrap();

    drop(handle);
    assert!(outcomes.changed().await.is_err());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn in_flight_attempt_completes_after_shutdown() {
    let fx = Fixture::new();
    let transport = Arc::new(GatedTransport {
        started: Notify::new(),
        release: Notify::new(),
    });
    let handle = fx.scheduler(transport.clone()).spawn();

    transport.started.notified().await;
    let stopping = tokio::spawn(handle.shutdown());
    transport.release.notify_one();
    stopping.await.unwrap();

    assert!(fx.last_sync().is_some());
}
