//! Backoff for HTTP 429 responses from the listing API.
//!
//! Only [`ScraperError::RateLimited`] is retried. Every other failure is
//! terminal for the page, and so for the coordinate being paginated.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 60;

fn is_retriable(err: &ScraperError) -> bool {
    matches!(err, ScraperError::RateLimited { .. })
}

/// Executes `operation`, retrying rate-limited attempts with exponential
/// backoff.
///
/// The wait before retry `n` (1-based) is the larger of
/// `backoff_base_secs * 2^(n-1)` and the server's `Retry-After` (capped at
/// 60 s). With `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let backoff_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        let retry_after_secs = match &err {
            ScraperError::RateLimited { retry_after_secs } => {
                (*retry_after_secs).min(MAX_RETRY_AFTER_SECS)
            }
            _ => 0,
        };
        let delay_secs = backoff_secs.max(retry_after_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "listing API rate limited; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
