//! Bounded retry with exponential backoff.
//!
//! [`RetryPolicy`] is a plain value so its bounds can be checked without
//! running any I/O. Transient errors (transport failures, timeouts, non-2xx
//! statuses) are retried; malformed bodies and bad URLs are returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`ScraperError::Http`] — connection failure, reset, or timeout.
/// - [`ScraperError::UnexpectedStatus`] — any non-2xx answer.
///
/// **Not retriable:**
/// - [`ScraperError::Deserialize`] — the same body would come back.
/// - [`ScraperError::InvalidUrl`] — nothing was sent.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. }
    )
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for every further retry.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff_base_ms,
        }
    }

    /// Policy that makes exactly one attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(1, 0)
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait before retry number `retry` (1-based).
    ///
    /// | Retry | Delay (`backoff_base_ms = 1000`) |
    /// |-------|----------------------------------|
    /// | 1     | 1 000 ms                         |
    /// | 2     | 2 000 ms                         |
    /// | 3     | 4 000 ms                         |
    ///
    /// Capped at 60 s.
    #[must_use]
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(20);
        let computed = self.backoff_base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(computed.min(MAX_DELAY_MS))
    }

    /// Runs `operation` until it succeeds, fails with a non-retriable error,
    /// or the attempt budget is spent. The last error is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retriable(&err) || attempt >= attempts {
                        return Err(err);
                    }
                    let delay = self.delay_before_retry(attempt);
                    tracing::warn!(
                        label,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient error, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
