//! Fixed-interval retry for transient fetch failures.

use crate::error::{Result, ScrapeError};
use std::future::Future;
use std::time::Duration;

/// Maximum number of attempts for a single fetch.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fixed wait between attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retry combinator with a bounded attempt budget and a fixed wait.
///
/// No backoff and no jitter here: request jitter is the rate limiter's job.
/// Each call site gets its own fresh attempt budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit attempt cap and inter-attempt wait.
    ///
    /// # Panics
    /// Panics if `max_attempts` is zero.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        assert!(max_attempts > 0, "max_attempts must be at least 1");
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `attempt` until it succeeds or the attempt cap is reached.
    ///
    /// On exhaustion the last failure is returned wrapped in
    /// [`ScrapeError::RetriesExhausted`], tagged with `operation` so logs
    /// identify which page or job the failure belongs to.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for n in 1..=self.max_attempts {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        operation,
                        attempt = n,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed"
                    );
                    last_error = Some(e);
                    if n < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(ScrapeError::RetriesExhausted {
            operation: operation.to_string(),
            attempts: self.max_attempts,
            source: Box::new(last_error.expect("at least one attempt ran")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_browser::BrowserError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fetch_error() -> ScrapeError {
        ScrapeError::Fetch {
            url: "https://example.com".to_string(),
            source: BrowserError::Timeout("https://example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let counter = &calls;
        let result = policy
            .run("probe", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await
            .expect("first attempt succeeds");

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let counter = &calls;
        let result = policy
            .run("probe", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(fetch_error())
                } else {
                    Ok("ready")
                }
            })
            .await
            .expect("third attempt succeeds");

        assert_eq!(result, "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_operation() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let counter = &calls;
        let err = policy
            .run::<(), _, _>("listing page 2", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(fetch_error())
            })
            .await
            .expect_err("attempts exhausted");

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            ScrapeError::RetriesExhausted {
                operation,
                attempts,
                source,
            } => {
                assert_eq!(operation, "listing page 2");
                assert_eq!(attempts, 3);
                assert!(matches!(*source, ScrapeError::Fetch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
