//! Bounded retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Default number of attempts for a stage, including the first.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Initial backoff between attempts (doubles with each retry).
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;

/// Maximum backoff between attempts.
const DEFAULT_MAX_BACKOFF_MS: u64 = 5000;

/// Retry budget applied to each pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,

    /// Backoff before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,

    /// Cap on the doubled backoff, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

/// Run `operation` under the retry policy.
///
/// Non-transient errors abort immediately and pass through unchanged.
/// When a transient error survives the full budget the result is a
/// [`PipelineError::StageFailed`] naming the stage and attempt count.
///
/// # Errors
///
/// Returns the first non-transient error, or `StageFailed` once the
/// budget is exhausted.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    stage: &'static str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut backoff_ms = policy.initial_backoff_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                attempt += 1;

                if attempt >= policy.max_attempts {
                    tracing::warn!(
                        stage,
                        attempts = attempt,
                        error = %e,
                        "stage failed after max attempts"
                    );
                    return Err(PipelineError::StageFailed {
                        stage,
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }

                tracing::debug!(
                    stage,
                    attempt,
                    backoff_ms,
                    error = %e,
                    "stage failed, retrying"
                );

                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;

                // Exponential backoff with cap
                backoff_ms = (backoff_ms * 2).min(policy.max_backoff_ms);
            }
        }
    }
}
