//! Supplier stock feed client.
//!
//! Every request first takes a token from the shared [`RateLimiter`]; the
//! supplier allows two calls per second by default.

use crate::auth::FeedApiKey;
use crate::error::{ClientError, ClientResult};
use crate::models::{ReservationRequest, StockFeedResponse};
use crate::rate_limit::RateLimiter;
use crate::response::{decode_json, decode_json_or_text};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default supplier rate limit.
pub const DEFAULT_FEED_REQUESTS_PER_SECOND: u32 = 2;

/// Source of upstream stock records.
#[async_trait]
pub trait StockFeed: Send + Sync {
    /// Fetch the current stock snapshot.
    async fn fetch_stock(&self) -> ClientResult<StockFeedResponse>;
}

/// Resolved settings for [`StockFeedClient`].
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Base URL of the supplier API, e.g. `https://restful.example.com`.
    pub base_url: String,
    pub api_key: FeedApiKey,
    pub lang_id: i32,
    pub price_drop: i32,
    pub requests_per_second: u32,
    pub timeout: Duration,
}

/// HTTP client for the supplier feed and its reservation endpoints.
#[derive(Debug, Clone)]
pub struct StockFeedClient {
    base_url: String,
    api_key: FeedApiKey,
    lang_id: i32,
    price_drop: i32,
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
}

impl StockFeedClient {
    /// Create a client with its own HTTP client and rate limiter.
    pub fn new(config: &FeedClientConfig) -> ClientResult<Self> {
        let http_client = crate::build_http_client(config.timeout)?;
        let rate_limiter = Arc::new(RateLimiter::per_second(config.requests_per_second));
        Self::with_http_client(config, http_client, rate_limiter)
    }

    /// Create a client with a pre-built `reqwest::Client` and limiter.
    pub fn with_http_client(
        config: &FeedClientConfig,
        http_client: Client,
        rate_limiter: Arc<RateLimiter>,
    ) -> ClientResult<Self> {
        if config.api_key.is_empty() {
            return Err(ClientError::InvalidConfig(
                "feed API key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            base_url: crate::normalize_base_url(&config.base_url)?,
            api_key: config.api_key.clone(),
            lang_id: config.lang_id,
            price_drop: config.price_drop,
            http_client,
            rate_limiter,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the stock feed as untyped JSON, exactly as the supplier sent it.
    pub async fn fetch_stock_raw(&self) -> ClientResult<Value> {
        let url = format!("{}/getStock/", self.base_url);
        self.rate_limiter.acquire().await;
        debug!(url = %url, lang_id = self.lang_id, price_drop = self.price_drop, "Feed GET");

        let builder = self.http_client.get(&url).query(&[
            ("lang_id", self.lang_id.to_string()),
            ("price_drop", self.price_drop.to_string()),
        ]);
        let response = self.api_key.apply(builder).send().await?;
        decode_json(response).await
    }

    /// Reserve stock for a SKU (`POST reserveArticle/new/`).
    pub async fn create_reservation(&self, request: &ReservationRequest) -> ClientResult<Value> {
        let url = format!("{}/reserveArticle/new/", self.base_url);
        self.rate_limiter.acquire().await;
        debug!(url = %url, sku = %request.sku, qty = request.qty, "Feed POST reservation");

        let builder = self.http_client.post(&url).form(request);
        let response = self.api_key.apply(builder).send().await?;
        decode_json_or_text(response).await
    }

    /// List open reservations (`GET reserveArticle/get/`).
    pub async fn list_reservations(&self) -> ClientResult<Value> {
        let url = format!("{}/reserveArticle/get/", self.base_url);
        self.rate_limiter.acquire().await;
        debug!(url = %url, "Feed GET reservations");

        let builder = self.http_client.get(&url);
        let response = self.api_key.apply(builder).send().await?;
        decode_json_or_text(response).await
    }
}

#[async_trait]
impl StockFeed for StockFeedClient {
    async fn fetch_stock(&self) -> ClientResult<StockFeedResponse> {
        let raw = self.fetch_stock_raw().await?;
        serde_json::from_value(raw)
            .map_err(|e| ClientError::ParseError(format!("Unexpected feed shape: {e}")))
    }
}
