//! Diff between the filtered feed and the catalog index.

use crate::config::SyncSettings;
use crate::index::CatalogIndex;
use crate::sku::is_valid_sku;
use crate::stock::StockRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// One change to apply to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// New product for a SKU the catalog does not have.
    Create(StockRecord),
    /// Set the stock level (and optionally the cost price) of a known product.
    UpdateStock {
        entry_id: u64,
        sku: String,
        quantity: u32,
        cost_price: Option<Decimal>,
    },
    /// Set the stock level of a product to zero.
    ZeroStock { entry_id: u64, sku: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    UpdateStock,
    ZeroStock,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::UpdateStock => write!(f, "update_stock"),
            Self::ZeroStock => write!(f, "zero_stock"),
        }
    }
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::UpdateStock { .. } => OperationKind::UpdateStock,
            Self::ZeroStock { .. } => OperationKind::ZeroStock,
        }
    }

    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        match self {
            Self::Create(record) => Some(&record.sku),
            Self::UpdateStock { sku, .. } => Some(sku),
            Self::ZeroStock { sku, .. } => sku.as_deref(),
        }
    }

    /// Target product id; `None` for creates.
    #[must_use]
    pub fn entry_id(&self) -> Option<u64> {
        match self {
            Self::Create(_) => None,
            Self::UpdateStock { entry_id, .. } | Self::ZeroStock { entry_id, .. } => Some(*entry_id),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(record) => {
                write!(f, "create {} (qty {})", record.sku, record.stock_quantity)
            }
            Self::UpdateStock {
                entry_id,
                sku,
                quantity,
                ..
            } => write!(f, "update #{entry_id} {sku} to {quantity}"),
            Self::ZeroStock { entry_id, sku } => {
                write!(f, "zero #{entry_id} {}", sku.as_deref().unwrap_or("<no sku>"))
            }
        }
    }
}

/// Operations for one run plus the upstream records that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub operations: Vec<Operation>,
    /// Upstream SKUs that failed the format check.
    pub invalid_skus: Vec<String>,
    /// Upstream SKUs seen again after their first record.
    pub duplicate_upstream: Vec<String>,
}

impl Plan {
    #[must_use]
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Build the operation list.
///
/// 1. Each eligible record with a valid SKU: update if indexed, else create.
/// 2. `set_missing_sku_to_zero`: zero indexed entries absent from the feed.
///    SKUs in `skipped_skus` were listed by the supplier but failed
///    validation; they count as present.
/// 3. `set_no_sku_to_zero`: zero listed entries without a SKU.
#[must_use]
pub fn plan(
    filtered: &[StockRecord],
    skipped_skus: &HashSet<String>,
    index: &CatalogIndex,
    settings: &SyncSettings,
) -> Plan {
    let mut result = Plan::default();
    let mut upstream_skus: HashSet<&str> = HashSet::with_capacity(filtered.len());

    for record in filtered {
        if !upstream_skus.insert(record.sku.as_str()) {
            warn!(sku = %record.sku, "Duplicate SKU in stock feed, keeping first");
            result.duplicate_upstream.push(record.sku.clone());
            continue;
        }

        if !is_valid_sku(&record.sku) {
            warn!(sku = %record.sku, "Invalid SKU format, skipping");
            result.invalid_skus.push(record.sku.clone());
            continue;
        }

        // Blacklisted SKUs never produce operations, even if unfiltered.
        if settings.blacklist.contains(&record.sku) {
            continue;
        }

        let operation = match index.get(&record.sku) {
            Some(entry) => Operation::UpdateStock {
                entry_id: entry.id,
                sku: record.sku.clone(),
                quantity: record.stock_quantity,
                cost_price: settings.track_cost_price.then_some(record.price),
            },
            None => Operation::Create(record.clone()),
        };
        result.operations.push(operation);
    }

    if settings.set_missing_sku_to_zero {
        for entry in index.entries() {
            let Some(sku) = entry.sku.as_deref() else {
                continue;
            };
            if !upstream_skus.contains(sku) && !skipped_skus.contains(sku) {
                result.operations.push(Operation::ZeroStock {
                    entry_id: entry.id,
                    sku: Some(sku.to_string()),
                });
            }
        }
    }

    if settings.set_no_sku_to_zero {
        for entry in index.entries_without_sku() {
            result.operations.push(Operation::ZeroStock {
                entry_id: entry.id,
                sku: None,
            });
        }
    }

    result
}
