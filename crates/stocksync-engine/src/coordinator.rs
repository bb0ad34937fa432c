//! Reconciliation Coordinator
//!
//! Drives one run through its phases:
//!
//! ```text
//! Fetching -> Filtering -> Indexing -> Planning -> Executing -> Summarizing -> Done
//!     |                       |
//!     +-------> Failed <------+
//! ```
//!
//! Only the two network-bound phases can fail the run. Operation failures
//! during `Executing` are recorded in the summary.

use crate::config::SyncConfig;
use crate::error::{RunFailure, SyncError};
use crate::executor::OperationExecutor;
use crate::index::{build_index, fetch_all_catalog_entries, CatalogEntry};
use crate::planner::{plan, OperationKind, Plan};
use crate::stock::{filter_stock, parse_stock, ParsedStock};
use crate::summary::RunSummary;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use stocksync_client::{CatalogStore, StockFeed};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Fetching,
    Filtering,
    Indexing,
    Planning,
    Executing,
    Summarizing,
    Done,
    Failed,
}

impl RunPhase {
    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::{Done, Executing, Failed, Fetching, Filtering, Indexing, Planning, Summarizing};
        matches!(
            (self, next),
            (Fetching, Filtering)
                | (Filtering, Indexing)
                | (Indexing, Planning)
                | (Planning, Executing)
                | (Executing, Summarizing)
                | (Summarizing, Done)
                | (Fetching, Failed)
                | (Indexing, Failed)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Indexing => "indexing",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a dry run: the plan that would have been executed.
#[derive(Debug)]
pub struct DryRun {
    pub summary: RunSummary,
    pub plan: Plan,
}

/// Tracks the current phase and the summary being built.
struct RunState {
    phase: RunPhase,
    summary: RunSummary,
}

impl RunState {
    fn new(dry_run: bool) -> Self {
        info!(phase = %RunPhase::Fetching, dry_run, "Starting synchronization");
        Self {
            phase: RunPhase::Fetching,
            summary: RunSummary::new(dry_run),
        }
    }

    /// Move to `next`. The transition table is only checked in debug
    /// builds; release builds trust the call order of `prepare` and `run`.
    fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid transition {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }

    fn fail(mut self, source: SyncError) -> RunFailure {
        let phase = self.phase;
        self.advance(RunPhase::Failed);
        self.summary.finalize();
        error!(
            phase = %phase,
            error = %source,
            fetched = self.summary.fetched,
            created = self.summary.created,
            updated = self.summary.updated,
            zeroed = self.summary.zeroed,
            failed = self.summary.failed,
            "Synchronization failed"
        );
        RunFailure {
            phase,
            summary: Box::new(self.summary),
            source,
        }
    }
}

/// Runs the full fetch → plan → execute pipeline.
pub struct ReconciliationCoordinator {
    feed: Arc<dyn StockFeed>,
    catalog: Arc<dyn CatalogStore>,
    config: Arc<SyncConfig>,
    cancel: CancellationToken,
}

impl ReconciliationCoordinator {
    pub fn new(
        feed: Arc<dyn StockFeed>,
        catalog: Arc<dyn CatalogStore>,
        config: Arc<SyncConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            feed,
            catalog,
            config,
            cancel,
        }
    }

    /// Execute one run. Returns the summary when the run reaches `Done`,
    /// even if individual operations failed.
    pub async fn run(&self) -> Result<RunSummary, RunFailure> {
        let (mut state, plan) = self.prepare(false).await?;

        state.advance(RunPhase::Executing);
        let executor = OperationExecutor::new(
            Arc::clone(&self.catalog),
            Arc::new(self.config.settings.clone()),
            self.config.executor.clone(),
            self.cancel.clone(),
        );
        let results = executor.execute(plan.operations).await;

        state.advance(RunPhase::Summarizing);
        for result in &results {
            state.summary.record(result);
        }
        state.summary.finalize();
        log_summary(&state.summary);

        state.advance(RunPhase::Done);
        Ok(state.summary)
    }

    /// Fetch and plan without writing anything to the catalog.
    pub async fn dry_run(&self) -> Result<DryRun, RunFailure> {
        let (mut state, plan) = self.prepare(true).await?;

        state.advance(RunPhase::Executing);
        for operation in &plan.operations {
            info!(op = %operation, "Planned operation");
        }

        state.advance(RunPhase::Summarizing);
        state.summary.created = plan.count(OperationKind::Create);
        state.summary.updated = plan.count(OperationKind::UpdateStock);
        state.summary.zeroed = plan.count(OperationKind::ZeroStock);
        state.summary.finalize();
        log_summary(&state.summary);

        state.advance(RunPhase::Done);
        Ok(DryRun {
            summary: state.summary,
            plan,
        })
    }

    /// Fetching through Planning.
    async fn prepare(&self, dry_run: bool) -> Result<(RunState, Plan), RunFailure> {
        let mut state = RunState::new(dry_run);
        let settings = &self.config.settings;

        let response = match self
            .config
            .fetch_retry
            .execute("fetch_stock", || self.feed.fetch_stock())
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(state.fail(SyncError::Feed(e))),
        };
        state.summary.fetched = response.stock.len();
        info!(fetched = state.summary.fetched, "Fetched stock feed");

        state.advance(RunPhase::Filtering);
        let ParsedStock {
            records,
            invalid,
            skipped_skus,
        } = parse_stock(&response.stock);
        for record in &invalid {
            warn!(sku = ?record.sku, reason = %record.reason, "Skipping invalid stock record");
        }
        state.summary.invalid_records = invalid.len();
        let filtered = filter_stock(records, &settings.blacklist);
        state.summary.filtered = filtered.len();
        info!(
            eligible = filtered.len(),
            invalid = invalid.len(),
            held = skipped_skus.len(),
            "Filtered stock records"
        );

        state.advance(RunPhase::Indexing);
        let products =
            match fetch_all_catalog_entries(self.catalog.as_ref(), &self.config.fetch_retry).await {
                Ok(products) => products,
                Err(e) => return Err(state.fail(e)),
            };
        state.summary.catalog_entries = products.len();
        let listing = products
            .iter()
            .map(CatalogEntry::from_product)
            .collect();
        let index = build_index(listing, &settings.blacklist);
        state.summary.indexed = index.len();
        state.summary.duplicate_catalog = index.duplicates().len();
        info!(
            listed = products.len(),
            indexed = index.len(),
            without_sku = index.entries_without_sku().len(),
            blacklisted = index.blacklisted(),
            "Built catalog index"
        );

        state.advance(RunPhase::Planning);
        let plan = plan(&filtered, &skipped_skus, &index, settings);
        state.summary.record_plan(&plan);
        info!(
            creates = plan.count(OperationKind::Create),
            updates = plan.count(OperationKind::UpdateStock),
            zeroes = plan.count(OperationKind::ZeroStock),
            invalid_skus = plan.invalid_skus.len(),
            "Planned operations"
        );

        Ok((state, plan))
    }
}

fn log_summary(summary: &RunSummary) {
    for failure in &summary.failures {
        warn!(
            kind = %failure.kind,
            sku = ?failure.sku,
            entry_id = ?failure.entry_id,
            attempts = failure.attempts,
            cause = %failure.cause,
            "Operation failed"
        );
    }
    info!(
        fetched = summary.fetched,
        filtered = summary.filtered,
        created = summary.created,
        updated = summary.updated,
        zeroed = summary.zeroed,
        failed = summary.failed,
        cancelled = summary.cancelled,
        skipped = summary.invalid_records + summary.skipped_invalid_sku,
        dry_run = summary.dry_run,
        duration_ms = summary.duration_ms().unwrap_or_default(),
        "Synchronization completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RunPhase::Fetching,
            RunPhase::Filtering,
            RunPhase::Indexing,
            RunPhase::Planning,
            RunPhase::Executing,
            RunPhase::Summarizing,
            RunPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_only_from_network_phases() {
        assert!(RunPhase::Fetching.can_transition_to(RunPhase::Failed));
        assert!(RunPhase::Indexing.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Filtering.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Planning.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Executing.can_transition_to(RunPhase::Failed));
    }

    #[test]
    fn test_no_transition_out_of_terminal_phases() {
        for next in [RunPhase::Fetching, RunPhase::Executing, RunPhase::Done, RunPhase::Failed] {
            assert!(!RunPhase::Done.can_transition_to(next));
            assert!(!RunPhase::Failed.can_transition_to(next));
        }
    }
}
