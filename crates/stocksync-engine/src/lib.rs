//! Stock reconciliation engine.
//!
//! Turns a supplier stock feed and a storefront catalog listing into a set of
//! catalog writes, then applies them:
//!
//! - [`stock`]: typed feed records and the spec/blacklist filter
//! - [`index`]: paginated catalog listing and the SKU index
//! - [`planner`]: create / update / zero decisions
//! - [`executor`]: bounded, retrying worker pool
//! - [`coordinator`]: the run state machine tying it together

pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod index;
pub mod payload;
pub mod planner;
pub mod sku;
pub mod stock;
pub mod summary;

pub use config::{Blacklist, ExecutorConfig, SyncConfig, SyncSettings};
pub use coordinator::{DryRun, ReconciliationCoordinator, RunPhase};
pub use error::{InvalidStockRecord, RunFailure, SyncError, SyncResult};
pub use executor::{OperationExecutor, OperationResult, OperationStatus};
pub use index::{build_index, fetch_all_catalog_entries, CatalogEntry, CatalogIndex};
pub use planner::{plan, Operation, OperationKind, Plan};
pub use sku::is_valid_sku;
pub use stock::{filter_stock, parse_stock, ParsedStock, StockRecord, StockSpec};
pub use summary::{OperationFailure, RunSummary};
