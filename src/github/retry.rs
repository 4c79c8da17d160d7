//! Exponential backoff retry logic for idempotent GitHub reads.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::debug;

/// Configuration: 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `MAX_ATTEMPTS` times. Errors for which
/// `should_retry` returns false are returned immediately; otherwise the task
/// sleeps for an exponentially increasing duration before the next attempt.
/// The last error is returned once attempts run out.
pub async fn retry_with_backoff<T, E, Fut, F, R>(mut attempt: F, should_retry: R) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempts >= MAX_ATTEMPTS || !should_retry(&e) {
                    return Err(e);
                }

                if let Some(wait_duration) = backoff.next_backoff() {
                    debug!("Attempt {} failed, retrying in {:?}", attempts, wait_duration);
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}
