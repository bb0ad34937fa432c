//! HTTP clients for the supplier stock feed and the storefront catalog.
//!
//! The engine talks to both sides through the [`feed::StockFeed`] and
//! [`catalog::CatalogStore`] traits; the reqwest-backed implementations live
//! here together with the retry policy and the token-bucket rate limiter.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod feed;
pub mod models;
pub mod rate_limit;
pub mod retry;

mod response;

pub use catalog::{CatalogClient, CatalogClientConfig, CatalogStore};
pub use error::{ClientError, ClientResult};
pub use feed::{FeedClientConfig, StockFeed, StockFeedClient};

use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared `reqwest::Client` with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("stocksync/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}

/// Validate a base URL and strip its trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidConfig(format!(
            "unsupported URL scheme '{}' in '{raw}'",
            parsed.scheme()
        )));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}
