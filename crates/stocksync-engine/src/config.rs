//! Resolved, immutable engine configuration.
//!
//! Built once by the caller (the CLI's config loader) and shared by reference
//! with every component for the lifetime of a run.

use crate::error::SyncError;
use std::collections::HashSet;
use std::time::Duration;
use stocksync_client::retry::RetryPolicy;

/// Default meta key used to store the supplier cost price on a product.
pub const DEFAULT_COST_PRICE_FIELD: &str = "_supplier_cost";

/// Default number of concurrent downstream writes.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// SKUs excluded from every sync operation, in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist(HashSet<String>);

impl Blacklist {
    /// Parse a comma-separated list; blank entries are dropped and entries trimmed.
    #[must_use]
    pub fn parse(csv: &str) -> Self {
        csv.split(',')
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn contains(&self, sku: &str) -> bool {
        self.0.contains(sku)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Blacklist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Feature toggles that shape the plan and the create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Attach the supplier image to created products.
    pub add_photos: bool,
    /// Zero out catalog products whose SKU disappeared from the feed.
    pub set_missing_sku_to_zero: bool,
    /// Zero out catalog products that have no SKU at all.
    pub set_no_sku_to_zero: bool,
    pub add_short_description: bool,
    pub add_long_description: bool,
    pub blacklist: Blacklist,
    /// Mirror the supplier price into a product meta field.
    pub track_cost_price: bool,
    pub cost_price_field: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            add_photos: true,
            set_missing_sku_to_zero: true,
            set_no_sku_to_zero: true,
            add_short_description: true,
            add_long_description: true,
            blacklist: Blacklist::default(),
            track_cost_price: true,
            cost_price_field: DEFAULT_COST_PRICE_FIELD.to_string(),
        }
    }
}

/// Worker pool settings for applying operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum number of in-flight downstream requests.
    pub max_concurrency: usize,
    /// Retry policy for stock updates (creates are never retried).
    pub update_retry: RetryPolicy,
    /// Optional cap on downstream writes per second; `None` means unlimited.
    pub downstream_requests_per_second: Option<u32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            update_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            downstream_requests_per_second: None,
        }
    }
}

/// Everything the coordinator needs besides the two clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    pub settings: SyncSettings,
    pub executor: ExecutorConfig,
    /// Retry budget for the feed fetch and for each catalog listing page.
    pub fetch_retry: RetryPolicy,
}

impl SyncConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.executor.max_concurrency == 0 {
            return Err(SyncError::Configuration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.executor.downstream_requests_per_second == Some(0) {
            return Err(SyncError::Configuration(
                "downstream_requests_per_second must be positive when set".to_string(),
            ));
        }
        if self.settings.track_cost_price && self.settings.cost_price_field.trim().is_empty() {
            return Err(SyncError::Configuration(
                "cost_price_field must not be empty when track_cost_price is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
