// Retry policy value and the generic retry combinator.
//
// Purpose
// - Give every fetch and write an explicit, bounded retry policy.
//
// Responsibilities
// - Run an async operation up to `max_retries + 1` times with a fixed delay between attempts.
// - Surface the last error once the attempts are exhausted.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, no retry.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(10))
    }
}

/// Policies owned by each kind of task in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicies {
    pub incremental: RetryPolicy,
    pub snapshot: RetryPolicy,
    pub write: RetryPolicy,
}

impl RetryPolicies {
    pub fn uniform(policy: RetryPolicy) -> Self {
        Self {
            incremental: policy,
            snapshot: policy,
            write: policy,
        }
    }
}

pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt_no = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt_no < max_attempts => {
                tracing::warn!(
                    operation,
                    attempt = attempt_no,
                    max_attempts,
                    error = %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt_no += 1;
            }
            Err(error) => {
                tracing::error!(operation, attempts = attempt_no, error = %error, "retries exhausted");
                return Err(error);
            }
        }
    }
}
