//! Executor retry behaviour against the real catalog client.

use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stocksync_client::auth::CatalogCredentials;
use stocksync_client::retry::RetryPolicy;
use stocksync_client::{CatalogClient, CatalogClientConfig, ClientError};
use stocksync_engine::{
    ExecutorConfig, Operation, OperationExecutor, OperationStatus, StockRecord, StockSpec,
    SyncSettings,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor(server: &MockServer, settings: SyncSettings) -> OperationExecutor {
    let client = CatalogClient::new(&CatalogClientConfig {
        store_url: server.uri(),
        credentials: CatalogCredentials::new("ck_test", "cs_test"),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    OperationExecutor::new(
        Arc::new(client),
        Arc::new(settings),
        ExecutorConfig {
            max_concurrency: 5,
            update_retry: RetryPolicy::new(3, Duration::from_millis(5)),
            downstream_requests_per_second: None,
        },
        CancellationToken::new(),
    )
}

fn new_record(sku: &str) -> StockRecord {
    StockRecord {
        sku: sku.to_string(),
        spec: StockSpec::Eu,
        price: Decimal::new(4999, 2),
        stock_quantity: 4,
        model: Some("Pixel 9".into()),
        color: None,
        category: None,
        ean: None,
        image_url: None,
        description: None,
    }
}

#[tokio::test]
async fn test_create_500_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .expect(1)
        .mount(&server)
        .await;

    let results = executor(&server, SyncSettings::default())
        .execute(vec![Operation::Create(new_record("N1"))])
        .await;

    assert_eq!(results[0].attempts, 1);
    match &results[0].status {
        OperationStatus::Failed(ClientError::Http { status, .. }) => assert_eq!(*status, 500),
        other => panic!("Expected HTTP failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_500_exhausts_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/10"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let results = executor(&server, SyncSettings::default())
        .execute(vec![Operation::ZeroStock {
            entry_id: 10,
            sku: Some("C3".into()),
        }])
        .await;

    assert_eq!(results[0].attempts, 3);
    assert!(matches!(
        results[0].status,
        OperationStatus::Failed(ClientError::MaxRetriesExceeded { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn test_update_404_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/99"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let results = executor(&server, SyncSettings::default())
        .execute(vec![Operation::ZeroStock {
            entry_id: 99,
            sku: None,
        }])
        .await;

    assert_eq!(results[0].attempts, 1);
    assert!(matches!(
        results[0].status,
        OperationStatus::Failed(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_sends_cost_meta() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/10"))
        .and(body_json(json!({
            "stock_quantity": 6,
            "meta_data": [{ "key": "_supplier_cost", "value": "49.99" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 10, "sku": "A1" })))
        .expect(1)
        .mount(&server)
        .await;

    let results = executor(&server, SyncSettings::default())
        .execute(vec![Operation::UpdateStock {
            entry_id: 10,
            sku: "A1".into(),
            quantity: 6,
            cost_price: Some(Decimal::new(4999, 2)),
        }])
        .await;

    assert!(results[0].is_applied());
}
