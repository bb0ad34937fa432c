//! Token bucket rate limiting shared across concurrent callers.
//!
//! The bucket reads time through a [`Clock`] so refill behaviour can be
//! driven by a manual clock in tests.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Token bucket state.
#[derive(Debug)]
struct TokenBucket {
    /// Available tokens.
    tokens: f64,
    /// Bucket size; also the burst allowance.
    max_tokens: f64,
    /// Tokens added per second.
    refill_rate: f64,
    /// Last refill timestamp.
    last_refill: Instant,
}

impl TokenBucket {
    fn new(tokens_per_second: u32, now: Instant) -> Self {
        let rate = f64::from(tokens_per_second.max(1));
        Self {
            tokens: rate,
            max_tokens: rate,
            refill_rate: rate,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;
        self.tokens = (self.tokens + new_tokens).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Take one token, or report how long until one is available.
    fn try_acquire(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(tokens_needed / self.refill_rate))
        }
    }
}

/// Rate limiter allowing `requests_per_second` calls per second with an
/// equal burst allowance.
///
/// Cheap to share behind an [`Arc`]; all state sits behind one async mutex.
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    clock: Arc<dyn Clock>,
    requests_per_second: u32,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Create a limiter driven by the system clock.
    #[must_use]
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::with_clock(requests_per_second, Arc::new(SystemClock))
    }

    /// Create a limiter driven by the given clock.
    #[must_use]
    pub fn with_clock(requests_per_second: u32, clock: Arc<dyn Clock>) -> Self {
        let bucket = TokenBucket::new(requests_per_second, clock.now());
        Self {
            bucket: Mutex::new(bucket),
            clock,
            requests_per_second: requests_per_second.max(1),
        }
    }

    /// Configured rate.
    #[must_use]
    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    /// Take a token without waiting. On failure returns the time until the
    /// next token becomes available.
    pub async fn try_acquire(&self) -> Result<(), Duration> {
        let now = self.clock.now();
        self.bucket.lock().await.try_acquire(now)
    }

    /// Take a token, sleeping until one is available.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire().await {
                Ok(()) => return,
                Err(wait) => {
                    trace!(wait_ms = wait.as_millis() as u64, "Rate limited, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Tokens currently in the bucket (after refilling to now).
    pub async fn available(&self) -> f64 {
        let now = self.clock.now();
        let mut bucket = self.bucket.lock().await;
        bucket.refill(now);
        bucket.tokens
    }
}
