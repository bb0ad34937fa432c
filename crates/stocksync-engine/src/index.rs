//! Catalog listing and the SKU index built from it.

use crate::config::Blacklist;
use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;
use stocksync_client::models::CatalogProduct;
use stocksync_client::retry::RetryPolicy;
use stocksync_client::CatalogStore;
use tracing::{debug, info, warn};

/// Upper bound on listing pages; a store that never returns an empty page
/// would otherwise be paged forever.
pub const MAX_LISTING_PAGES: u32 = 10_000;

/// A product as the engine sees it: its id and its SKU, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u64,
    pub sku: Option<String>,
}

impl CatalogEntry {
    /// Project a listed product. Blank SKUs become `None`.
    #[must_use]
    pub fn from_product(product: &CatalogProduct) -> Self {
        Self {
            id: product.id,
            sku: product.sku().map(str::to_string),
        }
    }
}

/// Fetch every catalog page until the store returns an empty one.
///
/// Each page gets its own retry budget. A page that still fails aborts the
/// listing: a partial catalog would make present products look missing.
pub async fn fetch_all_catalog_entries(
    store: &dyn CatalogStore,
    retry: &RetryPolicy,
) -> SyncResult<Vec<CatalogProduct>> {
    let mut products = Vec::new();

    for page in 1..=MAX_LISTING_PAGES {
        let batch = retry
            .execute("list_products", || store.list_products(page))
            .await
            .map_err(|source| SyncError::Listing { page, source })?;

        if batch.is_empty() {
            info!(pages = page - 1, products = products.len(), "Catalog listing complete");
            return Ok(products);
        }

        debug!(page, count = batch.len(), "Fetched catalog page");
        products.extend(batch);
    }

    Err(SyncError::ListingTooLarge {
        max_pages: MAX_LISTING_PAGES,
    })
}

/// A catalog SKU seen more than once; only `kept_id` is indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSku {
    pub sku: String,
    pub kept_id: u64,
    pub ignored_id: u64,
}

/// SKU → entry lookup for one run.
///
/// Never holds a blacklisted or SKU-less entry. On duplicate SKUs the first
/// listed entry wins. SKU-less entries of the full listing are kept aside
/// for the no-SKU zeroing rule.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_sku: HashMap<String, usize>,
    without_sku: Vec<CatalogEntry>,
    duplicates: Vec<DuplicateSku>,
    blacklisted: usize,
}

impl CatalogIndex {
    #[must_use]
    pub fn get(&self, sku: &str) -> Option<&CatalogEntry> {
        self.by_sku.get(sku).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, sku: &str) -> bool {
        self.by_sku.contains_key(sku)
    }

    /// Indexed entries in listing order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Entries of the unfiltered listing that carry no SKU.
    #[must_use]
    pub fn entries_without_sku(&self) -> &[CatalogEntry] {
        &self.without_sku
    }

    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateSku] {
        &self.duplicates
    }

    /// Number of listed entries skipped because their SKU is blacklisted.
    #[must_use]
    pub fn blacklisted(&self) -> usize {
        self.blacklisted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index a full catalog listing in one pass.
#[must_use]
pub fn build_index(listing: Vec<CatalogEntry>, blacklist: &Blacklist) -> CatalogIndex {
    let mut index = CatalogIndex::default();

    for entry in listing {
        let Some(sku) = entry.sku.clone() else {
            index.without_sku.push(entry);
            continue;
        };

        if blacklist.contains(&sku) {
            index.blacklisted += 1;
            continue;
        }

        if let Some(&existing) = index.by_sku.get(&sku) {
            let kept_id = index.entries[existing].id;
            warn!(sku = %sku, kept_id, ignored_id = entry.id, "Duplicate SKU in catalog, keeping first");
            index.duplicates.push(DuplicateSku {
                sku,
                kept_id,
                ignored_id: entry.id,
            });
            continue;
        }

        index.by_sku.insert(sku, index.entries.len());
        index.entries.push(entry);
    }

    index
}
