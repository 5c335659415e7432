use std::future::Future;
use std::time::Duration;

use super::Failure;
use crate::config::Settings;

/// Bounded retries with exponential backoff. Only `Failure::Transient` is
/// retried; `NotFound` returns immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.retry_attempts, settings.retry_backoff)
    }

    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, Failure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let mut delay = self.backoff;
        let mut tries = 1;

        loop {
            match attempt().await {
                Err(Failure::Transient(err)) if tries < self.attempts => {
                    tracing::warn!(attempt = tries, error = %err, "transient provider failure, backing off");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    tries += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::upstream_error;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = &AtomicU32::new(0);

        let result = quick(3)
            .run(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Failure::Transient(upstream_error()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), Failure> = quick(2)
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Failure::Transient(upstream_error()))
            })
            .await;

        assert!(matches!(result, Err(Failure::Transient(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn not_found_is_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), Failure> = tokio_test::block_on(quick(5).run(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Failure::NotFound)
        }));

        assert!(matches!(result, Err(Failure::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
