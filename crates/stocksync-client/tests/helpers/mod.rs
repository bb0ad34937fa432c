//! Shared builders for the wiremock-backed client tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stocksync_client::auth::{CatalogCredentials, FeedApiKey};
use stocksync_client::rate_limit::RateLimiter;
use stocksync_client::{CatalogClient, CatalogClientConfig, FeedClientConfig, StockFeedClient};
use wiremock::MockServer;

pub const FEED_KEY: &str = "feed-key-123";
pub const CONSUMER_KEY: &str = "ck_test";
pub const CONSUMER_SECRET: &str = "cs_test";

/// Feed client pointed at the mock server, with a generous rate limit so
/// tests never wait on tokens.
pub fn feed_client(server: &MockServer) -> StockFeedClient {
    let config = FeedClientConfig {
        base_url: server.uri(),
        api_key: FeedApiKey::new(FEED_KEY),
        lang_id: 0,
        price_drop: 0,
        requests_per_second: 100,
        timeout: Duration::from_secs(5),
    };
    StockFeedClient::with_http_client(
        &config,
        reqwest::Client::new(),
        Arc::new(RateLimiter::per_second(100)),
    )
    .unwrap()
}

/// Catalog client pointed at the mock server.
pub fn catalog_client(server: &MockServer) -> CatalogClient {
    catalog_client_with_timeout(server, Duration::from_secs(5))
}

pub fn catalog_client_with_timeout(server: &MockServer, timeout: Duration) -> CatalogClient {
    let config = CatalogClientConfig {
        store_url: server.uri(),
        credentials: CatalogCredentials::new(CONSUMER_KEY, CONSUMER_SECRET),
        timeout,
    };
    CatalogClient::new(&config).unwrap()
}

/// A feed item in the supplier's wire format.
pub fn feed_item(sku: &str, spec: &str, in_stock: i64, price: &str) -> Value {
    json!({
        "sku": sku,
        "price": price,
        "in_stock": in_stock,
        "model": "Galaxy S24",
        "color": "Black",
        "cat_name": "Phones",
        "ean": "8806095000000",
        "image": format!("https://img.example.com/{sku}.jpg"),
        "properties": {
            "item_spec": spec,
            "full_name": format!("Galaxy S24 128GB Black ({sku})"),
        }
    })
}

/// A catalog product in the storefront's wire format.
pub fn catalog_product(id: u64, sku: Option<&str>, stock: i64) -> Value {
    json!({
        "id": id,
        "sku": sku.unwrap_or(""),
        "name": format!("Product {id}"),
        "stock_quantity": stock,
        "regular_price": "10.00",
        "meta_data": []
    })
}
