//! Exponential backoff for provider requests.

use std::future::Future;

use tracing::warn;
use zkbridge_core::schema::RetryConfig;

use crate::provider::ProviderError;

/// Run `request` until it succeeds, fails permanently, or `policy.max_attempts` is used
/// up.
///
/// Only errors for which [`ProviderError::is_transient`] holds are retried. The wait
/// before retry `n` is [`RetryConfig::backoff`]`(n)`.
///
/// # Errors
/// Returns the first permanent error, or the last transient one once attempts run out.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryConfig,
    operation: &str,
    mut request: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut retry = 0_u32;
    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && retry.saturating_add(1) < max_attempts => {
                let delay = policy.backoff(retry);
                warn!(
                    operation,
                    attempt = retry.saturating_add(1),
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "Transient provider error, retrying"
                );
                tokio::time::sleep(delay).await;
                retry = retry.saturating_add(1);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    const POLICY: RetryConfig = RetryConfig {
        max_attempts: 4,
        initial_backoff_ms: 10,
        max_backoff_ms: 40,
    };

    fn transient() -> ProviderError {
        ProviderError::Transport("connection reset".to_owned())
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&POLICY, "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transient())
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.expect("third attempt succeeds"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&POLICY, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient())
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&POLICY, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::NotFound("tx".to_owned()))
        })
        .await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_with_backoff_between_attempts() {
        let start = tokio::time::Instant::now();
        let _ = with_retry(&POLICY, "test", || async { Err::<(), _>(transient()) }).await;
        // 10 + 20 + 40 ms of backoff before the fourth attempt.
        assert_eq!(start.elapsed().as_millis(), 70);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let policy = RetryConfig {
            max_attempts: 0,
            ..POLICY
        };
        let calls = AtomicU32::new(0);
        let _ = with_retry(&policy, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(transient())
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
