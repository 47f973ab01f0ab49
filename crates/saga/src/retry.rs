//! Bounded retry with exponential backoff for best-effort collaborators.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// How a client retries a failed call.
///
/// Only the state store and publisher clients use this; payment calls are
/// never repeated because their remote effect is not idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    #[default]
    NoRetry,
    /// Retry up to `max_attempts` times after the first attempt, sleeping
    /// `backoff_ms * 2^n` before retry `n`.
    Retry { max_attempts: u8, backoff_ms: u64 },
}

impl RetryPolicy {
    /// Create a retry policy with the given max attempts and backoff.
    pub const fn retries_with_backoff(max_attempts: u8, backoff_ms: u64) -> Self {
        if max_attempts == 0 {
            Self::NoRetry
        } else {
            Self::Retry {
                max_attempts,
                backoff_ms,
            }
        }
    }

    /// Check whether another retry is allowed after `attempt` retries.
    pub fn should_retry(&self, attempt: u8) -> bool {
        match self {
            Self::NoRetry => false,
            Self::Retry { max_attempts, .. } => attempt < *max_attempts,
        }
    }

    /// Sleep before retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u8) -> Duration {
        match self {
            Self::NoRetry => Duration::ZERO,
            Self::Retry { backoff_ms, .. } => {
                let factor = 1u64 << u32::from(attempt.min(16));
                Duration::from_millis(backoff_ms.saturating_mul(factor)).min(MAX_BACKOFF)
            }
        }
    }

    /// Longest time a call can take: every attempt hitting `per_attempt`
    /// plus all backoff sleeps.
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        match self {
            Self::NoRetry => per_attempt,
            Self::Retry { max_attempts, .. } => {
                let attempts = u32::from(*max_attempts) + 1;
                let sleeps: Duration = (0..*max_attempts).map(|n| self.backoff(n)).sum();
                per_attempt.saturating_mul(attempts) + sleeps
            }
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 0u8;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && self.should_retry(attempt) => {
                    let delay = self.backoff(attempt);
                    tracing::debug!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying failed call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
