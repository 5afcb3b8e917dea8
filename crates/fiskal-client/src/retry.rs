//! Retry logic with exponential backoff for submissions.
//!
//! Retries only on failures that [`FiskalError::is_retryable`] accepts:
//! connection failures, timeouts and 5xx statuses. A verified response,
//! even a rejecting one, is never resubmitted.

use std::future::Future;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::FiskalError;

/// Retry budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_base_ms))
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Backoff before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent.
    ///
    /// `op` receives the zero-based attempt number so it can rebuild the
    /// request for a retry.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, FiskalError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FiskalError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "submission failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}
