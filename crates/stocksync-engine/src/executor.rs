//! Operation Executor
//!
//! Applies planned operations against the catalog on a bounded pool of
//! tasks. Each operation is independent: its failure is recorded in its own
//! result and never stops its siblings.

use crate::config::{ExecutorConfig, SyncSettings};
use crate::payload::{new_product, stock_update};
use crate::planner::Operation;
use std::sync::Arc;
use stocksync_client::models::{CatalogProduct, ProductUpdate};
use stocksync_client::rate_limit::RateLimiter;
use stocksync_client::retry::RetryPolicy;
use stocksync_client::{CatalogStore, ClientError, ClientResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// How an operation ended.
#[derive(Debug)]
pub enum OperationStatus {
    /// The catalog accepted the write.
    Applied { product_id: u64 },
    /// Every attempt failed; holds the last error.
    Failed(ClientError),
    /// Never dispatched because shutdown was requested.
    Cancelled,
}

/// Result of one operation.
#[derive(Debug)]
pub struct OperationResult {
    pub operation: Operation,
    /// Calls made to the catalog, 0 when cancelled.
    pub attempts: u32,
    pub status: OperationStatus,
}

impl OperationResult {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OperationStatus::Applied { .. })
    }

    fn cancelled(operation: Operation) -> Self {
        Self {
            operation,
            attempts: 0,
            status: OperationStatus::Cancelled,
        }
    }
}

/// Bounded worker pool over a [`CatalogStore`].
pub struct OperationExecutor {
    store: Arc<dyn CatalogStore>,
    settings: Arc<SyncSettings>,
    config: ExecutorConfig,
    rate_limiter: Option<Arc<RateLimiter>>,
    cancel: CancellationToken,
}

impl OperationExecutor {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        settings: Arc<SyncSettings>,
        config: ExecutorConfig,
        cancel: CancellationToken,
    ) -> Self {
        let rate_limiter = config
            .downstream_requests_per_second
            .map(|rps| Arc::new(RateLimiter::per_second(rps)));
        Self {
            store,
            settings,
            config,
            rate_limiter,
            cancel,
        }
    }

    /// Use a specific limiter for catalog writes instead of the configured one.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Apply all operations, at most `max_concurrency` at a time.
    ///
    /// Results come back in plan order. Once the cancellation token fires no
    /// further operation is dispatched; in-flight ones run to completion.
    #[instrument(skip_all, fields(operations = operations.len()))]
    pub async fn execute(&self, operations: Vec<Operation>) -> Vec<OperationResult> {
        let total = operations.len();
        let concurrency = self.config.max_concurrency.max(1);
        let write_rps = self.rate_limiter.as_deref().map(RateLimiter::requests_per_second);
        info!(total, concurrency, write_rps = ?write_rps, "Executing operations");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<OperationResult>> = Vec::with_capacity(total);
        let mut dispatched: Vec<Option<Operation>> = Vec::with_capacity(total);

        for (index, operation) in operations.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };

            let Some(permit) = permit else {
                slots.push(Some(OperationResult::cancelled(operation)));
                dispatched.push(None);
                continue;
            };

            let store = Arc::clone(&self.store);
            let settings = Arc::clone(&self.settings);
            let retry = self.config.update_retry.clone();
            let limiter = self.rate_limiter.clone();
            let task_operation = operation.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let result = apply(store.as_ref(), &settings, &retry, limiter.as_deref(), task_operation).await;
                (index, result)
            });

            slots.push(None);
            dispatched.push(Some(operation));
        }

        let skipped = slots.iter().filter(|s| s.is_some()).count();
        if skipped > 0 {
            warn!(skipped, "Shutdown requested, remaining operations not dispatched");
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "Operation task aborted"),
            }
        }

        slots
            .into_iter()
            .zip(dispatched)
            .filter_map(|(slot, operation)| {
                // A dispatched operation without a result lost its task.
                slot.or_else(|| {
                    operation.map(|operation| OperationResult {
                        operation,
                        attempts: 0,
                        status: OperationStatus::Failed(ClientError::Unreachable(
                            "operation task aborted".to_string(),
                        )),
                    })
                })
            })
            .collect()
    }
}

async fn apply(
    store: &dyn CatalogStore,
    settings: &SyncSettings,
    retry: &RetryPolicy,
    limiter: Option<&RateLimiter>,
    operation: Operation,
) -> OperationResult {
    let mut attempts = 0u32;

    let outcome = match &operation {
        Operation::Create(record) => {
            let product = new_product(record, settings);
            attempts = 1;
            if let Some(limiter) = limiter {
                limiter.acquire().await;
            }
            store.create_product(&product).await
        }
        Operation::UpdateStock {
            entry_id,
            quantity,
            cost_price,
            ..
        } => {
            let update = stock_update(*quantity, *cost_price, settings);
            update_with_retry(store, retry, limiter, *entry_id, &update, &mut attempts).await
        }
        Operation::ZeroStock { entry_id, .. } => {
            let update = stock_update(0, None, settings);
            update_with_retry(store, retry, limiter, *entry_id, &update, &mut attempts).await
        }
    };

    let status = match outcome {
        Ok(product) => {
            debug!(op = %operation, product_id = product.id, attempts, "Operation applied");
            OperationStatus::Applied {
                product_id: product.id,
            }
        }
        Err(e) => {
            warn!(op = %operation, attempts, error = %e, "Operation failed");
            OperationStatus::Failed(e)
        }
    };

    OperationResult {
        operation,
        attempts,
        status,
    }
}

async fn update_with_retry(
    store: &dyn CatalogStore,
    retry: &RetryPolicy,
    limiter: Option<&RateLimiter>,
    id: u64,
    update: &ProductUpdate,
    attempts: &mut u32,
) -> ClientResult<CatalogProduct> {
    retry
        .execute("update_product", || {
            *attempts += 1;
            async move {
                if let Some(limiter) = limiter {
                    limiter.acquire().await;
                }
                store.update_product(id, update).await
            }
        })
        .await
}
