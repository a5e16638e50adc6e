//! Async retry driver.

use std::future::Future;

use crate::retry::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs `operation` until it succeeds or the policy gives up. Sleeps the
/// backoff delay between attempts.
pub async fn run_with_retry<T, E, K, F, Fut>(
    policy: &RetryPolicy,
    classify: K,
    mut operation: F,
) -> Result<T, E>
where
    K: Fn(&E) -> ErrorKind,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => match policy.decide(attempt, classify(&error)) {
                RetryDecision::NoRetry => return Err(error),
                RetryDecision::RetryAfter(delay) => {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
