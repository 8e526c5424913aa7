//! Retry/Backoff Executor for model calls.
//!
//! Wraps any async operation. Failures are classified by inspecting the error
//! message for rate-limit markers; only rate-limited failures are retried,
//! with exponential delay `base_delay * 2^attempt`. When retries run out on a
//! rate-limited failure the caller gets [`RetryError::QuotaExceeded`] with a
//! fixed message and the provider's wording is discarded. Anything else
//! propagates on the spot.
//!
//! # Example
//!
//! ```ignore
//! let policy = RetryPolicy::default(); // 3 retries, 2s base delay
//! let response = policy
//!     .execute("discover_segments", || provider.complete(request.clone()))
//!     .await?;
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::ports::QUOTA_EXCEEDED_MESSAGE;

/// Case-insensitive substrings that mark a failure as rate limiting.
pub const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "resource_exhausted", "quota"];

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    Other,
}

impl FailureKind {
    /// Classifies an error by its message.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker)) {
            FailureKind::RateLimited
        } else {
            FailureKind::Other
        }
    }

    /// Classifies any displayable error.
    pub fn of<E: fmt::Display>(err: &E) -> Self {
        Self::classify(&err.to_string())
    }
}

/// Outcome of an exhausted or aborted retry loop.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt was rate limited.
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded {
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// A failure that was not rate limiting, returned unchanged.
    #[error("{0}")]
    Failed(E),
}

/// Backoff schedule for rate-limited calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Runs `op` until it succeeds, fails for a non-rate-limit reason, or
    /// exhausts `max_retries + 1` attempts.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: &str,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 0u32;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(operation, attempt, "Model call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => match FailureKind::of(&err) {
                    FailureKind::Other => return Err(RetryError::Failed(err)),
                    FailureKind::RateLimited if attempt < self.max_retries => {
                        let delay = self.delay_for(attempt);
                        tracing::warn!(
                            operation,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Rate limited, backing off before retry"
                        );
                        sleep(delay).await;
                        attempt += 1;
                    }
                    FailureKind::RateLimited => {
                        tracing::error!(
                            operation,
                            attempts = attempt + 1,
                            "Rate limiting persisted through every retry"
                        );
                        return Err(RetryError::QuotaExceeded {
                            attempts: attempt + 1,
                        });
                    }
                },
            }
        }
    }
}
