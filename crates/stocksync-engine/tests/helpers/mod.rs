//! In-memory feed and catalog used by the engine scenarios.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stocksync_client::models::{
    CatalogProduct, NewProduct, ProductUpdate, RawStockItem, StockFeedResponse,
};
use stocksync_client::retry::RetryPolicy;
use stocksync_client::{CatalogStore, ClientError, ClientResult, StockFeed};
use stocksync_engine::{ExecutorConfig, SyncConfig, SyncSettings};

/// Feed returning a fixed snapshot, or a fixed error.
pub struct FakeFeed {
    items: Vec<RawStockItem>,
    error: Option<fn() -> ClientError>,
    pub calls: AtomicU32,
}

impl FakeFeed {
    pub fn with_items(items: Vec<RawStockItem>) -> Arc<Self> {
        Arc::new(Self {
            items,
            error: None,
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing(error: fn() -> ClientError) -> Arc<Self> {
        Arc::new(Self {
            items: Vec::new(),
            error: Some(error),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl StockFeed for FakeFeed {
    async fn fetch_stock(&self) -> ClientResult<StockFeedResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.error {
            Some(make) => Err(make()),
            None => Ok(StockFeedResponse {
                stock: self.items.clone(),
            }),
        }
    }
}

/// Write recorded by [`FakeCatalog`].
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Create(NewProduct),
    Update(u64, ProductUpdate),
}

/// Paged in-memory catalog with injectable failures.
#[derive(Default)]
pub struct FakeCatalog {
    products: Vec<CatalogProduct>,
    page_size: usize,
    failing_page: Option<u32>,
    failing_create_skus: HashSet<String>,
    failing_update_ids: HashSet<u64>,
    next_id: AtomicU32,
    pub writes: Mutex<Vec<Write>>,
    pub list_calls: Mutex<Vec<u32>>,
    pub update_calls: AtomicU32,
}

impl FakeCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self {
            products,
            page_size: 2,
            next_id: AtomicU32::new(1000),
            ..Self::default()
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Listing this page answers with a network error.
    pub fn fail_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Creating this SKU answers HTTP 500.
    pub fn fail_create(mut self, sku: &str) -> Self {
        self.failing_create_skus.insert(sku.to_string());
        self
    }

    /// Updating this product answers HTTP 500.
    pub fn fail_update(mut self, id: u64) -> Self {
        self.failing_update_ids.insert(id);
        self
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(u64, u32)> {
        let mut updates: Vec<_> = self
            .writes()
            .into_iter()
            .filter_map(|w| match w {
                Write::Update(id, update) => Some((id, update.stock_quantity)),
                Write::Create(_) => None,
            })
            .collect();
        updates.sort_unstable();
        updates
    }

    pub fn created_skus(&self) -> Vec<String> {
        let mut skus: Vec<_> = self
            .writes()
            .into_iter()
            .filter_map(|w| match w {
                Write::Create(product) => Some(product.sku),
                Write::Update(..) => None,
            })
            .collect();
        skus.sort();
        skus
    }
}

#[async_trait]
impl CatalogStore for FakeCatalog {
    async fn list_products(&self, page: u32) -> ClientResult<Vec<CatalogProduct>> {
        self.list_calls.lock().unwrap().push(page);
        if self.failing_page == Some(page) {
            return Err(ClientError::Unreachable("connection reset by peer".into()));
        }
        let start = (page as usize - 1) * self.page_size;
        Ok(self
            .products
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<CatalogProduct> {
        if self.failing_create_skus.contains(&product.sku) {
            return Err(ClientError::Http {
                status: 500,
                body: "internal error".into(),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push(Write::Create(product.clone()));
        let id = u64::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(catalog_product(id, Some(&product.sku), i64::from(product.stock_quantity)))
    }

    async fn update_product(&self, id: u64, update: &ProductUpdate) -> ClientResult<CatalogProduct> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_update_ids.contains(&id) {
            return Err(ClientError::Http {
                status: 500,
                body: "internal error".into(),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push(Write::Update(id, update.clone()));
        Ok(catalog_product(id, None, i64::from(update.stock_quantity)))
    }
}

pub fn catalog_product(id: u64, sku: Option<&str>, stock: i64) -> CatalogProduct {
    CatalogProduct {
        id,
        sku: sku.map(str::to_string),
        name: Some(format!("Product {id}")),
        stock_quantity: Some(stock),
        regular_price: Some("10.00".into()),
        meta_data: Vec::new(),
    }
}

pub fn stock_item(sku: &str, spec: &str, in_stock: u32) -> RawStockItem {
    RawStockItem::from_value(json!({
        "sku": sku,
        "price": "199.90",
        "in_stock": in_stock,
        "model": "Galaxy S24",
        "color": "Black",
        "cat_name": "Phones",
        "ean": "8806095000000",
        "properties": { "item_spec": spec }
    }))
}

/// Engine config with cost tracking off and millisecond backoff.
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        settings: SyncSettings {
            track_cost_price: false,
            ..SyncSettings::default()
        },
        executor: ExecutorConfig {
            max_concurrency: 5,
            update_retry: RetryPolicy::new(3, Duration::from_millis(1)),
            downstream_requests_per_second: None,
        },
        fetch_retry: RetryPolicy::new(3, Duration::from_millis(1)),
    }
}
