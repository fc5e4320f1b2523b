//! Retry policy and the shared retry executor.
//!
//! [`with_retry`] is the single place where provider calls are repeated.
//! Only failures whose [`ErrorClass`] is in the policy's retry set are
//! repeated (transport and 5xx by default); everything else, including
//! 4xx client errors, is returned on the spot without consuming the
//! remaining attempts.
//!
//! When attempts run out on a retryable failure the caller sees a single
//! [`VerbatimError::GatewayTimeout`] wrapping the last underlying error,
//! never the raw transport detail.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ErrorClass;
use crate::telemetry;
use crate::{Result, VerbatimError};

/// Bounded exponential-backoff retry policy.
///
/// The delay before retry `n` (0-indexed) is `base_delay * multiplier^n`.
/// With the defaults that is 3s, 6s, 12s, 24s between five attempts.
///
/// ```rust
/// # use verbatim::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_attempts(3)
///     .base_delay(Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 5.
    pub max_attempts: u32,
    /// Delay before the first retry. Default: 3s.
    pub base_delay: Duration,
    /// Backoff multiplier applied per attempt. Default: 2.
    pub multiplier: u32,
    /// Failure classes worth retrying. Default: transport and server.
    pub retry_on: HashSet<ErrorClass>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
            multiplier: 2,
            retry_on: HashSet::from([ErrorClass::Transport, ErrorClass::Server]),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub fn multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Replace the set of retryable failure classes.
    pub fn retry_on(mut self, classes: impl IntoIterator<Item = ErrorClass>) -> Self {
        self.retry_on = classes.into_iter().collect();
        self
    }

    /// Delay before retrying after the given (0-indexed) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(attempt))
    }

    /// Whether `err` belongs to a retryable class under this policy.
    pub fn is_retryable(&self, err: &VerbatimError) -> bool {
        err.class().is_some_and(|class| self.retry_on.contains(&class))
    }
}

/// Execute an async operation under `policy`.
///
/// `f` is invoked once per attempt. A policy with `max_attempts == 0` is
/// treated as a single attempt.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, provider_name: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let err = match f().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };
        if !policy.is_retryable(&err) {
            return Err(err); // client error, no retry
        }

        attempt += 1;
        if attempt >= max_attempts {
            warn!(
                provider = provider_name,
                attempts = max_attempts,
                error = %err,
                "retries exhausted"
            );
            return Err(VerbatimError::GatewayTimeout {
                attempts: max_attempts,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_for_attempt(attempt - 1);
        metrics::counter!(telemetry::RETRIES_TOTAL,
            "provider" => provider_name.to_owned(),
        )
        .increment(1);
        warn!(
            provider = provider_name,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying after transient error"
        );
        tokio::time::sleep(delay).await;
    }
}
