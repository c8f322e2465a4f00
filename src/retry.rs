//! Bounded retry with exponential backoff
//!
//! Every external call goes through a [`Retryer`]. Whether a failure is
//! retried at all is decided by its classified kind (see
//! [`Error::is_terminal`]); waits between attempts grow exponentially and
//! are capped by the policy.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Retry configuration, supplied at construction and immutable afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (values below 1 behave as 1)
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_wait: Duration,
    /// Upper bound on any single wait
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// The wait before retrying after the given 1-based attempt
    ///
    /// `initial_wait * 2^(attempt - 1)`, capped at `max_wait`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        // Cap the exponent so the shift cannot overflow; max_wait clamps the
        // result long before that matters in practice.
        let exponent = attempt.saturating_sub(1).min(20);
        self.initial_wait
            .saturating_mul(1 << exponent)
            .min(self.max_wait)
    }
}

/// Injectable wait primitive so tests can run retries with zero delay
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Production [`Sleeper`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs a unit of work with bounded retry and exponential backoff
#[derive(Clone)]
pub struct Retryer {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Retryer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retryer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Retryer {
    /// Create a retryer that waits on the tokio timer
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Create a retryer with an injected wait primitive (for tests)
    #[must_use]
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// The policy this retryer was built with
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` up to `max_attempts` times
    ///
    /// Terminal errors (see [`Error::is_terminal`]) are returned immediately.
    /// After exhausting all attempts on a retriable error the last cause is
    /// wrapped in [`Error::RetriesExhausted`] together with the attempt
    /// count; any partial result from a failed attempt is dropped with it.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<Error> = None;

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_terminal() => {
                    debug!(attempt, kind = ?e.kind(), "terminal error, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    debug!(attempt, max_attempts, error = %e, "attempt failed");
                    last_error = Some(e);
                    if attempt < max_attempts {
                        self.sleeper.sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        let Some(source) = last_error else {
            return Err(Error::Internal(
                "retry loop ended without an error".to_string(),
            ));
        };
        Err(Error::RetriesExhausted {
            attempts: max_attempts,
            source: Box::new(source),
        })
    }
}
