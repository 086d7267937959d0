//! Caller-side retry with growing backoff
//!
//! None of the upstream clients retry on their own. Callers that want a
//! retry policy wrap the call in [`retry_operation`].

use std::future::Future;
use std::time::Duration;

/// Run `operation` up to `max_attempts` times.
///
/// **Backoff Strategy:**
/// - Delay before attempt `n + 1` is `base_delay * n`
/// - No delay after the final attempt
///
/// Every failed attempt is logged at WARN. The error from the last attempt is
/// returned when all attempts fail. `max_attempts` of 0 is treated as 1.
pub async fn retry_operation<F, Fut, T, E>(
    operation_name: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Attempt failed"
                );

                if attempt >= max_attempts {
                    return Err(err);
                }

                tokio::time::sleep(base_delay * attempt).await;
            }
        }
    }
}
