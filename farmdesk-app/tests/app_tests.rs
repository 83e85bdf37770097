use async_trait::async_trait;
use farmdesk_app::{AppConfig, AppError, AuthError, FarmApp};
use farmdesk_assistant::{Assistant, AssistantResult, ChatTurn, CONNECTION_ERROR};
use farmdesk_storage::{keys, seed_orders, KeyValueStore, MemoryKvStore};
use farmdesk_sync::{
    CheckOutcome, HttpTransport, HttpTransportConfig, ReplicationTransport, SyncResult,
};
use farmdesk_types::{
    filters, ExpenseForm, ExpenseRecord, FarmSnapshot, HarvestForm, HarvestRecord, Order, Period,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl ReplicationTransport for CountingTransport {
    async fn replicate(&self, _endpoint: &str, _snapshot: &FarmSnapshot) -> SyncResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Answers with the number of orders it was shown.
struct OrderCounter;

#[async_trait]
impl Assistant for OrderCounter {
    async fn ask(
        &self,
        snapshot: &FarmSnapshot,
        _history: &[ChatTurn],
        question: &str,
    ) -> AssistantResult<String> {
        Ok(format!("{question}: {} orders", snapshot.orders.len()))
    }
}

fn app_with(
    kv: Arc<MemoryKvStore>,
    transport: Arc<dyn ReplicationTransport>,
    assistant: Option<Arc<dyn Assistant>>,
) -> FarmApp {
    FarmApp::with_parts(AppConfig::default(), kv, transport, assistant)
}

fn app() -> (FarmApp, Arc<MemoryKvStore>, Arc<CountingTransport>) {
    let kv = Arc::new(MemoryKvStore::new());
    let transport = Arc::new(CountingTransport::default());
    (app_with(kv.clone(), transport.clone(), None), kv, transport)
}

fn harvest_form(date: &str, weight: &str) -> HarvestForm {
    HarvestForm {
        date: date.into(),
        greenhouse: "2".into(),
        vegetable: "Tomato".into(),
        other_vegetable: None,
        weight: weight.into(),
    }
}

// ── Session ─────────────────────────────────────────────────────

#[test]
fn login_rejects_malformed_and_wrong_pins() {
    let (mut app, kv, _) = app();

    assert!(matches!(
        app.login("123"),
        Err(AppError::Auth(AuthError::MalformedPin))
    ));
    assert!(matches!(
        app.login("12345a"),
        Err(AppError::Auth(AuthError::MalformedPin))
    ));
    assert!(matches!(
        app.login("123456"),
        Err(AppError::Auth(AuthError::InvalidPin))
    ));
    assert!(!app.is_logged_in());
    assert_eq!(kv.get(keys::IS_LOGGED_IN).unwrap(), None);
}

#[test]
fn login_persists_the_session() {
    let (mut app, kv, _) = app();
    app.login("999000").unwrap();

    assert!(app.is_logged_in());
    assert_eq!(kv.get(keys::IS_LOGGED_IN).unwrap().as_deref(), Some("true"));

    let reopened = app_with(kv, Arc::new(CountingTransport::default()), None);
    assert!(reopened.is_logged_in());
}

#[test]
fn login_without_a_runtime_does_not_replicate() {
    let (mut app, _, transport) = app();
    app.login("999000").unwrap();
    assert!(!app.is_replicating());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn configured_pin_replaces_the_default() {
    let config = AppConfig {
        access_pin: "123456".into(),
        ..AppConfig::default()
    };
    let mut app = FarmApp::with_parts(
        config,
        Arc::new(MemoryKvStore::new()),
        Arc::new(CountingTransport::default()),
        None,
    );
    assert!(app.login("999000").is_err());
    app.login("123456").unwrap();
}

// ── Replication lifecycle ───────────────────────────────────────

#[tokio::test]
async fn login_starts_replication_and_logout_stops_it() {
    let (mut app, kv, transport) = app();
    app.login("999000").unwrap();
    assert!(app.is_replicating());

    let mut outcomes = app.replication_outcomes().unwrap();
    tokio::time::timeout(Duration::from_secs(5), outcomes.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        *outcomes.borrow(),
        Some(CheckOutcome::Replicated { .. })
    ));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert!(app.sync_config().last_sync.is_some());

    app.logout().await.unwrap();
    assert!(!app.is_replicating());
    assert!(!app.is_logged_in());
    assert_eq!(kv.get(keys::IS_LOGGED_IN).unwrap(), None);
}

#[tokio::test]
async fn clearing_the_endpoint_stops_replication() {
    let (mut app, _, _) = app();
    app.login("999000").unwrap();
    assert!(app.is_replicating());

    let config = app.set_endpoint(None).await.unwrap();
    assert_eq!(config.endpoint(), None);
    assert!(!app.is_replicating());

    let config = app
        .set_endpoint(Some("https://sheets.example.test/exec"))
        .await
        .unwrap();
    assert_eq!(config.endpoint(), Some("https://sheets.example.test/exec"));
    assert!(app.is_replicating());

    app.shutdown().await;
}

#[tokio::test]
async fn setting_an_endpoint_while_logged_out_does_not_replicate() {
    let (mut app, _, transport) = app();
    app.set_endpoint(Some("https://sheets.example.test/exec"))
        .await
        .unwrap();
    assert!(!app.is_replicating());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resume_session_restarts_replication_for_a_persisted_login() {
    let kv = Arc::new(MemoryKvStore::new());
    kv.put(keys::IS_LOGGED_IN, "true").unwrap();
    let mut app = app_with(kv, Arc::new(CountingTransport::default()), None);

    assert!(!app.is_replicating());
    assert!(app.resume_session());
    app.shutdown().await;
}

#[tokio::test]
async fn sync_now_posts_the_ledger_and_records_the_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&HttpTransportConfig::default()).unwrap();
    let mut app = app_with(Arc::new(MemoryKvStore::new()), Arc::new(transport), None);
    let endpoint = format!("{}/exec", server.uri());
    app.set_endpoint(Some(endpoint.as_str())).await.unwrap();

    let at = app.sync_now().await.unwrap();
    assert_eq!(app.sync_config().last_sync, Some(at));
}

#[tokio::test]
async fn sync_now_without_an_endpoint_fails() {
    let (mut app, _, transport) = app();
    app.set_endpoint(None).await.unwrap();

    assert!(matches!(app.sync_now().await, Err(AppError::Sync(_))));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.sync_config().last_sync, None);
}

// ── Records ─────────────────────────────────────────────────────

#[test]
fn validated_entries_are_listed_newest_first() {
    let (app, _, _) = app();
    let first = app.add(harvest_form("2025-07-01", "12.5").validate().unwrap()).unwrap();
    let second = app.add(harvest_form("2025-07-02", "4").validate().unwrap()).unwrap();
    app.add(harvest_form("2025-08-01", "1").validate().unwrap()).unwrap();

    let july = app.list(filters::in_period::<HarvestRecord>("2025-07".parse().unwrap()));
    let ids: Vec<_> = july.iter().map(|h| h.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn rejected_entries_never_reach_the_store() {
    let (app, _, _) = app();
    for weight in ["", "-1", "NaN", "heavy"] {
        let err = harvest_form("2025-07-01", weight).validate().unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }
    assert!(app.list(filters::any::<HarvestRecord>).is_empty());
}

#[test]
fn update_and_remove_by_id() {
    let (app, _, _) = app();
    let harvest = app.add(harvest_form("2025-07-01", "10").validate().unwrap()).unwrap();

    let patch = farmdesk_types::HarvestPatch {
        weight: Some(11.0),
        ..Default::default()
    };
    assert!(app.update::<HarvestRecord>(&harvest.id, patch).unwrap());
    assert_eq!(app.list(filters::any::<HarvestRecord>)[0].weight, 11.0);

    assert!(app.remove::<HarvestRecord>(&harvest.id).unwrap());
    assert!(!app.remove::<HarvestRecord>(&harvest.id).unwrap());
}

#[test]
fn invalid_updates_are_refused_as_validation_errors() {
    let (app, kv, _) = app();
    let harvest = app.add(harvest_form("2025-07-01", "10").validate().unwrap()).unwrap();
    let before = kv.get("harvests").unwrap();

    let nan = farmdesk_types::HarvestPatch {
        weight: Some(f64::NAN),
        ..Default::default()
    };
    assert!(matches!(
        app.update::<HarvestRecord>(&harvest.id, nan),
        Err(AppError::Validation(_))
    ));

    let bare_other = farmdesk_types::HarvestPatch {
        vegetable_type: Some(farmdesk_types::VegetableType::Other),
        ..Default::default()
    };
    assert!(matches!(
        app.update::<HarvestRecord>(&harvest.id, bare_other),
        Err(AppError::Validation(_))
    ));

    assert_eq!(kv.get("harvests").unwrap(), before);
    assert_eq!(app.list(filters::any::<HarvestRecord>), vec![harvest]);
}

#[test]
fn records_survive_reopening_the_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        data_path: dir.path().join("farm.db"),
        ..AppConfig::default()
    };

    let app = FarmApp::open(config.clone()).unwrap();
    let form = ExpenseForm {
        date: "2025-07-05".into(),
        category: "Fertilizer".into(),
        other_category: None,
        description: "urea".into(),
        amount: "1500".into(),
    };
    let expense = app.add(form.validate().unwrap()).unwrap();
    drop(app);

    let reopened = FarmApp::open(config).unwrap();
    assert_eq!(
        reopened.list(filters::any::<ExpenseRecord>),
        vec![expense]
    );
    assert_eq!(
        reopened.list(filters::any::<Order>).len(),
        seed_orders().len()
    );
}

// ── Summaries ───────────────────────────────────────────────────

#[test]
fn totals_and_reports_cover_seeded_sales() {
    let (app, _, _) = app();
    let seeded_revenue: f64 = seed_orders().iter().map(Order::revenue).sum();
    let july = seed_orders()
        .into_iter()
        .filter(|o| o.date.year() == 2025 && o.date.month() == 7)
        .collect::<Vec<_>>();

    app.add(
        ExpenseForm {
            date: "2025-07-10".into(),
            category: "Labor".into(),
            other_category: None,
            description: String::new(),
            amount: "1000".into(),
        }
        .validate()
        .unwrap(),
    )
    .unwrap();

    let totals = app.totals();
    assert!((totals.total_revenue - seeded_revenue).abs() < 1e-6);
    assert!((totals.net_profit - (seeded_revenue - 1000.0)).abs() < 1e-6);

    let report = app.report(Period::YearMonth {
        year: 2025,
        month: 7,
    });
    assert_eq!(report.order_count, july.len());
    assert_eq!(report.expense_count, 1);
    let july_revenue: f64 = july.iter().map(Order::revenue).sum();
    assert!((report.net_profit - (july_revenue - 1000.0)).abs() < 1e-6);
}

// ── Assistant ───────────────────────────────────────────────────

#[tokio::test]
async fn ask_without_an_assistant_apologizes() {
    let (app, _, _) = app();
    assert_eq!(app.ask(&[], "How are sales?").await, CONNECTION_ERROR);
}

#[tokio::test]
async fn ask_shows_the_assistant_current_data() {
    let assistant: Arc<dyn Assistant> = Arc::new(OrderCounter);
    let app = app_with(
        Arc::new(MemoryKvStore::new()),
        Arc::new(CountingTransport::default()),
        Some(assistant),
    );
    let answer = app.ask(&[ChatTurn::user("hi")], "count").await;
    assert_eq!(answer, format!("count: {} orders", seed_orders().len()));
}
