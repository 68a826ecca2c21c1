#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::inventory::ListError;
use config::Retry;
use std::future::Future;
use tracing::warn;

/// Run `operation` until it succeeds, fails permanently, or uses up
/// `policy.max_attempts`.
///
/// Waits `policy.backoff_for(n)` after the n-th transient failure. On
/// failure returns the last error with the number of attempts made.
pub async fn with_backoff<T, F, Fut>(
    policy: &Retry,
    clock: &dyn Clock,
    mut operation: F,
) -> Result<T, (ListError, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ListError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(attempt, max_attempts, ?delay, %err, "listing failed, retrying");
                clock.sleep(delay).await;
            }
            Err(err) => return Err((err, attempt)),
        }
    }
}
