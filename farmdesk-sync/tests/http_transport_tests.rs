use farmdesk_sync::{HttpTransport, HttpTransportConfig, ReplicationTransport, SyncError};
use farmdesk_types::{
    ExpenseCategory, ExpenseRecord, FarmSnapshot, GreenhouseNumber, HarvestRecord, IsoDate, Order,
    OrderStatus, PaymentStatus, RecordId, VegetableType,
};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot() -> FarmSnapshot {
    FarmSnapshot {
        harvests: vec![HarvestRecord {
            id: RecordId::from("h1"),
            date: IsoDate::parse("2025-07-01").unwrap(),
            greenhouse_number: GreenhouseNumber::new(3).unwrap(),
            vegetable_type: VegetableType::Tomato,
            other_vegetable: None,
            weight: 12.5,
        }],
        work_records: vec![],
        orders: vec![Order {
            id: RecordId::from("3"),
            date: IsoDate::parse("2025-07-30").unwrap(),
            vegetable_type: VegetableType::Cucumber,
            other_vegetable: None,
            weight: 38.9,
            price: 230.0,
            order_status: OrderStatus::Completed,
            payment_status: PaymentStatus::Paid,
        }],
        expenses: vec![ExpenseRecord {
            id: RecordId::from("e1"),
            date: IsoDate::parse("2025-07-02").unwrap(),
            category: ExpenseCategory::Seeds,
            other_category: None,
            description: "seeds".into(),
            amount: 500.0,
        }],
    }
}

fn transport() -> HttpTransport {
    HttpTransport::new(&HttpTransportConfig::default()).unwrap()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_default_has_no_timeout() {
    let cfg = HttpTransportConfig::default();
    assert_eq!(cfg.timeout_secs, None);
    assert!(cfg.user_agent.starts_with("farmdesk/"));
}

// ── Requests ────────────────────────────────────────────────────

#[tokio::test]
async fn posts_full_snapshot_as_json() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "harvests": [{
            "id": "h1", "date": "2025-07-01", "greenhouseNumber": 3,
            "vegetableType": "Tomato", "weight": 12.5
        }],
        "workRecords": [],
        "orders": [{
            "id": "3", "date": "2025-07-30", "vegetableType": "Cucumber",
            "weight": 38.9, "price": 230.0,
            "orderStatus": "Completed", "paymentStatus": "Paid"
        }],
        "expenses": [{
            "id": "e1", "date": "2025-07-02", "category": "Seeds",
            "description": "seeds", "amount": 500.0
        }]
    });

    Mock::given(method("POST"))
        .and(path("/macros/exec"))
        .and(header("content-type", "application/json"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/macros/exec", server.uri());
    transport().replicate(&endpoint, &snapshot()).await.unwrap();
}

#[tokio::test]
async fn error_status_still_counts_as_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let result = transport().replicate(&server.uri(), &FarmSnapshot::default()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    // Bind and release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let endpoint = format!("http://127.0.0.1:{port}/exec");
    let err = transport()
        .replicate(&endpoint, &FarmSnapshot::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn malformed_url_is_rejected() {
    let err = transport()
        .replicate("not a url", &FarmSnapshot::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidEndpoint { .. }));

    let err = transport()
        .replicate("ftp://example.com/exec", &FarmSnapshot::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidEndpoint { .. }));
}

#[tokio::test]
async fn configured_timeout_fails_slow_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&HttpTransportConfig {
        timeout_secs: Some(1),
        ..Default::default()
    })
    .unwrap();
    let err = transport
        .replicate(&server.uri(), &FarmSnapshot::default())
        .await
        .unwrap_err();
    match err {
        SyncError::Network(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}
