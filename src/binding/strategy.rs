//! Retry and poll strategies.
//!
//! A strategy looks at the latest outcome and answers with a delay before the
//! next attempt, or `None` to stop. The binding layer never retries or polls
//! on its own; these helpers only build the closures callers hand it.

use crate::transform::{ErrorReason, TransformedError};
use std::sync::Arc;
use std::time::Duration;

/// Result of one attempt as seen by strategies and callbacks
pub type Outcome<T> = Result<T, TransformedError>;

/// `should_retry(outcome, run_count)`, consulted after a failed attempt.
/// `run_count` counts attempts since the last success, starting at 1.
pub type RetryStrategy<T> = Arc<dyn Fn(&Outcome<T>, u32) -> Option<Duration> + Send + Sync>;

/// `should_poll(outcome)`, consulted after an attempt that is not retried.
pub type PollStrategy<T> = Arc<dyn Fn(&Outcome<T>) -> Option<Duration> + Send + Sync>;

/// Exponential backoff for failed attempts
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `attempt` (0-based)
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64;
        let exponent = attempt.min(30) as i32;
        let delay_ms = (base_delay * self.backoff_multiplier.powi(exponent))
            .min(self.max_delay_ms as f64);

        let final_delay_ms = if self.jitter {
            // up to 25% extra
            let jitter_factor = fastrand::f64().mul_add(0.25, 1.0);
            delay_ms * jitter_factor
        } else {
            delay_ms
        } as u64;

        Duration::from_millis(final_delay_ms)
    }

    /// Builds a retry strategy that backs off on retryable failures until
    /// `max_attempts` runs have been made.
    #[must_use]
    pub fn into_strategy<T: 'static>(self) -> RetryStrategy<T> {
        Arc::new(move |outcome: &Outcome<T>, run_count: u32| match outcome {
            Err(error) if run_count < self.max_attempts && is_retryable(error) => {
                Some(self.delay_for(run_count.saturating_sub(1)))
            }
            _ => None,
        })
    }
}

/// Whether a failure is worth another attempt.
///
/// Network failures are. Server failures are when the status says the
/// condition may be transient: 408, 429, and 5xx other than 501 and 505.
#[must_use]
pub fn is_retryable(error: &TransformedError) -> bool {
    match error.reason {
        ErrorReason::Network => true,
        ErrorReason::Parse => false,
        ErrorReason::Server => error.status.is_some_and(|status| match status {
            408 | 429 => true,
            500..=599 => !matches!(status, 501 | 505),
            _ => false,
        }),
    }
}

/// Polls at a fixed interval after every successful attempt.
#[must_use]
pub fn poll_every<T: 'static>(interval: Duration) -> PollStrategy<T> {
    Arc::new(move |outcome: &Outcome<T>| outcome.is_ok().then_some(interval))
}
