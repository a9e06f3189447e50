//! Retry helper for provisioning.
//!
//! The DAO never retries; this is for callers that wait on the store, such as
//! table creation right after starting DynamoDB Local.

use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Fibonacci backoff: delays grow `d, d, 2d, 3d, 5d, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial_delay: Duration,
    pub max_retries: usize,
}

impl Backoff {
    pub fn new(initial_delay: Duration, max_retries: usize) -> Self {
        Self {
            initial_delay,
            max_retries,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        let (mut current, mut next) = (self.initial_delay, self.initial_delay);
        for _ in 0..attempt {
            (current, next) = (next, current + next);
        }
        current
    }
}

/// Runs `operation` until it succeeds or `backoff.max_retries` retries failed.
/// The last error is returned unchanged.
pub async fn retry_with_backoff<T, E, Fut, F>(operation: F, backoff: Backoff) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < backoff.max_retries => {
                let delay = backoff.delay(attempt);
                warn!(
                    "Operation failed: {:?}. Retrying in {:?} (attempt {}/{})",
                    e,
                    delay,
                    attempt + 1,
                    backoff.max_retries
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
