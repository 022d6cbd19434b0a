//! Admission control for outbound requests.
//!
//! The limiter bounds how many guarded operations run at once and spaces
//! request starts by a randomized delay, so repeated runs look like
//! human-scale traffic to the remote site.
//!
//! Pacing is global across every caller sharing the limiter: the delay is
//! measured from the last *admitted* start, not from the caller's own last
//! request. Admissions are strictly serialized (the pacing lock is held
//! across the jittered sleep), while up to `max_concurrent` guarded
//! operations may overlap once admitted.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Rate limiter shared by all fetches of one scrape run.
#[derive(Debug)]
pub struct RateLimiter {
    delays: RwLock<(Duration, Duration)>,
    permits: RwLock<Arc<Semaphore>>,
    last_start: Mutex<Option<Instant>>,
    request_count: AtomicU64,
    waited_micros: AtomicU64,
}

/// Concurrency slot held for the duration of a guarded operation.
///
/// Dropping the permit releases the slot; keep it alive around the whole
/// fetch, not just the pacing wait.
#[derive(Debug)]
pub struct RatePermit {
    _permit: OwnedSemaphorePermit,
}

/// Counters reported after a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterStats {
    /// Requests admitted so far
    pub request_count: u64,
    /// Total time spent waiting on pacing
    pub total_wait: Duration,
    /// Mean pacing wait per admitted request
    pub avg_wait: Duration,
}

impl RateLimiter {
    /// Create a limiter with a delay range in seconds and a concurrency cap.
    ///
    /// # Panics
    /// Panics if the delays are negative or inverted, or `max_concurrent`
    /// is zero.
    #[must_use]
    pub fn new(min_delay: f64, max_delay: f64, max_concurrent: u32) -> Self {
        assert!(min_delay >= 0.0, "min_delay must not be negative");
        assert!(
            min_delay <= max_delay,
            "min_delay must not exceed max_delay"
        );
        assert!(max_concurrent > 0, "max_concurrent must be at least 1");

        Self {
            delays: RwLock::new((
                Duration::from_secs_f64(min_delay),
                Duration::from_secs_f64(max_delay),
            )),
            permits: RwLock::new(Arc::new(Semaphore::new(max_concurrent as usize))),
            last_start: Mutex::new(None),
            request_count: AtomicU64::new(0),
            waited_micros: AtomicU64::new(0),
        }
    }

    /// Wait for admission: a free concurrency slot, then the jittered delay
    /// measured from the last admitted start.
    ///
    /// The returned permit holds the concurrency slot until dropped.
    pub async fn acquire(&self) -> RatePermit {
        let semaphore = self.semaphore();
        let permit = semaphore
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");

        let mut last_start = self.last_start.lock().await;
        let delay = self.jittered_delay();
        if let Some(last) = *last_start {
            let since_last = last.elapsed();
            if since_last < delay {
                let wait = delay - since_last;
                tracing::debug!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "Rate limiting");
                tokio::time::sleep(wait).await;
                self.waited_micros.fetch_add(
                    u64::try_from(wait.as_micros()).unwrap_or(u64::MAX),
                    Ordering::Relaxed,
                );
            }
        }
        *last_start = Some(Instant::now());
        self.request_count.fetch_add(1, Ordering::Relaxed);
        drop(last_start);

        RatePermit { _permit: permit }
    }

    /// Replace the delay range, in seconds.
    ///
    /// # Panics
    /// Panics if the delays are negative or inverted.
    pub fn set_delay_range(&self, min_delay: f64, max_delay: f64) {
        assert!(min_delay >= 0.0, "min_delay must not be negative");
        assert!(
            min_delay <= max_delay,
            "min_delay must not exceed max_delay"
        );
        *self.delays.write().expect("limiter state poisoned") = (
            Duration::from_secs_f64(min_delay),
            Duration::from_secs_f64(max_delay),
        );
    }

    /// Replace the concurrency cap.
    ///
    /// Takes effect for subsequent admissions; already-admitted callers keep
    /// the slot they hold.
    ///
    /// # Panics
    /// Panics if `max_concurrent` is zero.
    pub fn set_max_concurrent(&self, max_concurrent: u32) {
        assert!(max_concurrent > 0, "max_concurrent must be at least 1");
        *self.permits.write().expect("limiter state poisoned") =
            Arc::new(Semaphore::new(max_concurrent as usize));
    }

    /// Snapshot of the request and wait counters.
    #[must_use]
    pub fn stats(&self) -> RateLimiterStats {
        let request_count = self.request_count.load(Ordering::Relaxed);
        let total_wait = Duration::from_micros(self.waited_micros.load(Ordering::Relaxed));
        let avg_wait = total_wait / u32::try_from(request_count.max(1)).unwrap_or(u32::MAX);
        RateLimiterStats {
            request_count,
            total_wait,
            avg_wait,
        }
    }

    fn semaphore(&self) -> Arc<Semaphore> {
        self.permits.read().expect("limiter state poisoned").clone()
    }

    fn jittered_delay(&self) -> Duration {
        let (min, max) = *self.delays.read().expect("limiter state poisoned");
        if max <= min {
            min
        } else {
            let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
            Duration::from_secs_f64(secs)
        }
    }
}
