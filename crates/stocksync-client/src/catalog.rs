//! Storefront catalog REST client (`/wp-json/wc/v3`).

use crate::auth::CatalogCredentials;
use crate::error::{ClientError, ClientResult};
use crate::models::{CatalogProduct, NewProduct, ProductUpdate};
use crate::response::decode_json;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Products requested per listing page.
pub const PAGE_SIZE: u32 = 100;

/// REST prefix appended to the store URL.
const API_PREFIX: &str = "wp-json/wc/v3";

/// Downstream catalog operations used by the reconciliation engine.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// One page of the product listing (1-based). An empty page ends pagination.
    async fn list_products(&self, page: u32) -> ClientResult<Vec<CatalogProduct>>;

    /// Create a product.
    async fn create_product(&self, product: &NewProduct) -> ClientResult<CatalogProduct>;

    /// Update a product's mutable fields.
    async fn update_product(&self, id: u64, update: &ProductUpdate)
        -> ClientResult<CatalogProduct>;
}

/// Resolved settings for [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Store URL, e.g. `https://shop.example.com`.
    pub store_url: String,
    pub credentials: CatalogCredentials,
    pub timeout: Duration,
}

/// HTTP client for the storefront catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    api_url: String,
    credentials: CatalogCredentials,
    http_client: Client,
}

impl CatalogClient {
    pub fn new(config: &CatalogClientConfig) -> ClientResult<Self> {
        let http_client = crate::build_http_client(config.timeout)?;
        Self::with_http_client(config, http_client)
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    pub fn with_http_client(config: &CatalogClientConfig, http_client: Client) -> ClientResult<Self> {
        if !config.credentials.is_complete() {
            return Err(ClientError::InvalidConfig(
                "catalog consumer key and secret must both be set".to_string(),
            ));
        }
        let store_url = crate::normalize_base_url(&config.store_url)?;
        Ok(Self {
            api_url: format!("{store_url}/{API_PREFIX}"),
            credentials: config.credentials.clone(),
            http_client,
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl CatalogStore for CatalogClient {
    async fn list_products(&self, page: u32) -> ClientResult<Vec<CatalogProduct>> {
        let url = format!("{}/products", self.api_url);
        debug!(url = %url, page, "Catalog GET");

        let builder = self
            .http_client
            .get(&url)
            .query(&[("per_page", PAGE_SIZE), ("page", page)]);
        let response = self.credentials.apply(builder).send().await?;
        decode_json(response).await
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<CatalogProduct> {
        let url = format!("{}/products", self.api_url);
        debug!(url = %url, sku = %product.sku, "Catalog POST");

        let builder = self.http_client.post(&url).json(product);
        let response = self.credentials.apply(builder).send().await?;
        decode_json(response).await
    }

    async fn update_product(
        &self,
        id: u64,
        update: &ProductUpdate,
    ) -> ClientResult<CatalogProduct> {
        let url = format!("{}/products/{id}", self.api_url);
        debug!(url = %url, stock_quantity = update.stock_quantity, "Catalog PUT");

        let builder = self.http_client.put(&url).json(update);
        let response = self.credentials.apply(builder).send().await?;
        decode_json(response).await
    }
}
