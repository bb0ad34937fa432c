//! Credentials for the feed (raw `Authorization` key) and the catalog
//! (HTTP basic auth with consumer key/secret).
//!
//! The [`Debug`] impls redact secrets so credentials never end up in logs.

use reqwest::RequestBuilder;
use std::fmt;

/// API key sent verbatim in the `Authorization` header of feed requests.
#[derive(Clone)]
pub struct FeedApiKey(String);

impl FeedApiKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Attach the key to a request.
    #[must_use]
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, &self.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for FeedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeedApiKey").field(&"[REDACTED]").finish()
    }
}

/// Consumer key/secret pair for the catalog REST API.
#[derive(Clone)]
pub struct CatalogCredentials {
    consumer_key: String,
    consumer_secret: String,
}

impl CatalogCredentials {
    #[must_use]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Attach basic auth to a request.
    #[must_use]
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.consumer_key, Some(&self.consumer_secret))
    }

    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.consumer_key.trim().is_empty() && !self.consumer_secret.trim().is_empty()
    }
}

impl fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}
