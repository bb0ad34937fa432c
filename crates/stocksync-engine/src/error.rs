//! Engine error types.

use crate::coordinator::RunPhase;
use crate::summary::RunSummary;
use stocksync_client::ClientError;
use thiserror::Error;

/// Fatal errors: any of these stops the run before operations are applied.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The upstream stock feed could not be fetched.
    #[error("stock feed fetch failed: {0}")]
    Feed(#[source] ClientError),

    /// A catalog listing page failed after its retry budget.
    #[error("catalog listing failed on page {page}: {source}")]
    Listing {
        page: u32,
        #[source]
        source: ClientError,
    },

    /// The catalog kept returning pages past the safety limit.
    #[error("catalog listing exceeded {max_pages} pages")]
    ListingTooLarge { max_pages: u32 },

    /// The engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result alias for fatal engine steps.
pub type SyncResult<T> = Result<T, SyncError>;

/// A run that ended in the `Failed` state.
///
/// Carries the phase it failed in and the counters gathered so far, so the
/// caller can still report them.
#[derive(Debug, Error)]
#[error("reconciliation failed during {phase}: {source}")]
pub struct RunFailure {
    pub phase: RunPhase,
    pub summary: Box<RunSummary>,
    #[source]
    pub source: SyncError,
}

/// Why an upstream item could not become a stock record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stock record {}: {reason}", sku.as_deref().unwrap_or("<no sku>"))]
pub struct InvalidStockRecord {
    pub sku: Option<String>,
    pub reason: String,
}

impl InvalidStockRecord {
    pub fn new(sku: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            sku: sku.map(str::to_string),
            reason: reason.into(),
        }
    }
}
