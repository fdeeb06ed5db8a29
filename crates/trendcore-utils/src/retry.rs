//! Exponential backoff shared by the LLM client and hotspot analyzer.

use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// `2^attempt` seconds, matching the LLM client's retry budget and the
/// original `asyncio.sleep(2 ** attempt)` backoff.
pub fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Run `operation` up to `max_retries + 1` times, sleeping `2^attempt`
/// seconds between attempts. Returns the last error if every attempt fails.
pub async fn retry_with_backoff<F, Fut, T, E>(max_retries: u32, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_retries {
                    return Err(err);
                }
                warn!(attempt, %err, "retrying after backoff");
                sleep(backoff_duration(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        assert_eq!(backoff_duration(0), Duration::from_secs(1));
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn retry_with_backoff_gives_up_after_budget() {
        let mut calls = 0;
        let result: Result<(), &str> = retry_with_backoff(1, |_attempt| {
            calls += 1;
            async move { Err("boom") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
