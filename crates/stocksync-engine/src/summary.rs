//! Per-run counters and failure list.

use crate::executor::{OperationResult, OperationStatus};
use crate::planner::{OperationKind, Plan};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An operation that did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationFailure {
    pub kind: OperationKind,
    pub sku: Option<String>,
    pub entry_id: Option<u64>,
    pub attempts: u32,
    pub cause: String,
}

/// Outcome of one run, created at start and finalized once all results
/// are in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    /// Items in the upstream feed.
    pub fetched: usize,
    /// Feed items dropped for missing or malformed fields.
    pub invalid_records: usize,
    /// Records left after the spec and blacklist filter.
    pub filtered: usize,
    /// Products in the full catalog listing.
    pub catalog_entries: usize,
    pub indexed: usize,
    pub duplicate_catalog: usize,
    pub duplicate_upstream: usize,
    pub skipped_invalid_sku: usize,
    pub planned: usize,
    pub created: usize,
    pub updated: usize,
    pub zeroed: usize,
    pub failed: usize,
    /// Operations never dispatched because of shutdown.
    pub cancelled: usize,
    pub failures: Vec<OperationFailure>,
}

impl RunSummary {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            fetched: 0,
            invalid_records: 0,
            filtered: 0,
            catalog_entries: 0,
            indexed: 0,
            duplicate_catalog: 0,
            duplicate_upstream: 0,
            skipped_invalid_sku: 0,
            planned: 0,
            created: 0,
            updated: 0,
            zeroed: 0,
            failed: 0,
            cancelled: 0,
            failures: Vec::new(),
        }
    }

    /// Copy the planner's skip counters and operation count.
    pub fn record_plan(&mut self, plan: &Plan) {
        self.planned = plan.len();
        self.skipped_invalid_sku = plan.invalid_skus.len();
        self.duplicate_upstream = plan.duplicate_upstream.len();
    }

    /// Count one executed operation.
    pub fn record(&mut self, result: &OperationResult) {
        match &result.status {
            OperationStatus::Applied { .. } => match result.operation.kind() {
                OperationKind::Create => self.created += 1,
                OperationKind::UpdateStock => self.updated += 1,
                OperationKind::ZeroStock => self.zeroed += 1,
            },
            OperationStatus::Failed(error) => {
                self.failed += 1;
                self.failures.push(OperationFailure {
                    kind: result.operation.kind(),
                    sku: result.operation.sku().map(str::to_string),
                    entry_id: result.operation.entry_id(),
                    attempts: result.attempts,
                    cause: error.to_string(),
                });
            }
            OperationStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Whether any operation failed for the given SKU.
    #[must_use]
    pub fn failed_for(&self, sku: &str) -> bool {
        self.failures.iter().any(|f| f.sku.as_deref() == Some(sku))
    }

    /// Wall time of the run, once finalized.
    #[must_use]
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}
