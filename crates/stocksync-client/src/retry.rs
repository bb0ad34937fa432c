//! Exponential backoff retry logic for feed and catalog calls.

use crate::error::{ClientError, ClientResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one (1 = no retries).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each following retry.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and base delay.
    /// The maximum delay cap defaults to 60 seconds.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Whether the error should be retried after the given zero-based attempt.
    ///
    /// Retries network failures, timeouts, 429 and 5xx responses while the
    /// attempt budget lasts.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ClientError) -> bool {
        if attempt + 1 >= self.max_attempts {
            return false;
        }
        error.is_retryable() || error.is_server_error()
    }

    /// Delay to wait after the given zero-based attempt failed.
    ///
    /// A `Retry-After` hint on [`ClientError::RateLimited`] wins over the
    /// exponential schedule `base_delay * 2^attempt`. Both are capped at
    /// `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ClientError) -> Duration {
        let delay = if let ClientError::RateLimited {
            retry_after_secs: Some(retry_after),
        } = error
        {
            Duration::from_secs(*retry_after)
        } else {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt))
        };
        delay.min(self.max_delay)
    }

    /// Execute an async operation with retry.
    ///
    /// The closure is called until it succeeds, a permanent error comes back,
    /// or the attempt budget runs out. When more than one attempt was made the
    /// last error is wrapped in [`ClientError::MaxRetriesExceeded`].
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.should_retry(attempt, &error) {
                        if attempt > 0 {
                            warn!(
                                operation = operation_name,
                                attempts = attempt + 1,
                                error = %error,
                                "Max retries exceeded"
                            );
                            return Err(ClientError::MaxRetriesExceeded {
                                attempts: attempt + 1,
                                message: format!(
                                    "{operation_name} failed after {} attempt(s): {error}",
                                    attempt + 1
                                ),
                            });
                        }
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt, &error);
                    debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
