//! Rate-limit retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::backend::AiError;

/// Parse Retry-After header value (seconds).
/// Returns duration to wait, or None if header is missing/invalid.
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(60)))
}

/// Calculate exponential backoff delay for a given attempt.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay_ms.min(60_000))
}

/// Run `op` until it returns something other than [`AiError::RateLimited`],
/// retrying at most `max_retries` times.
///
/// The server's Retry-After wins over the computed backoff.
pub async fn retry_on_rate_limit<T, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut op: F,
) -> Result<T, AiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Err(AiError::RateLimited { retry_after_secs }) if attempt < max_retries => {
                let wait = retry_after_secs
                    .map(|secs| Duration::from_secs(secs.min(60)))
                    .unwrap_or_else(|| backoff_delay(attempt, base_delay_ms));
                warn!("AI rate limited (attempt {}), waiting {:?}", attempt + 1, wait);
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
