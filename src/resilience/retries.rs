//! Retry logic for one-shot glue calls (quotes, metadata lookups).
//!
//! The send-and-confirm waiter does NOT use this: it paces itself on fixed
//! intervals and its own deadline.

use std::fmt::Display;
use std::future::Future;

use crate::resilience::backoff::BackoffPolicy;

/// Run `op` until it succeeds, returns a non-retryable error, or the
/// attempt budget is spent. Sleeps with jittered backoff between attempts.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &BackoffPolicy,
    operation: &str,
    is_retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
