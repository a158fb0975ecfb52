//! Fixed-interval throttle.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

/// Default throttle rate when none is given.
pub const DEFAULT_MAX_PER_SECOND: u32 = 100;

/// Delays every invocation by `1 / max_per_second` seconds.
///
/// This is a plain throttle: each call sleeps the full interval before it
/// runs, and no burst credit builds up between calls.
///
/// # Example
/// ```no_run
/// use std::num::NonZeroU32;
/// use gauth::util::rate_limit::RateLimiter;
///
/// # async fn example() {
/// let limiter = RateLimiter::per_second(NonZeroU32::new(50).unwrap());
/// let value = limiter.execute(|| async { 42 }).await;
/// assert_eq!(value, 42);
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    interval: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_interval(Duration::from_secs(1) / DEFAULT_MAX_PER_SECOND)
    }
}

impl RateLimiter {
    pub fn per_second(max_per_second: NonZeroU32) -> Self {
        Self::from_interval(Duration::from_secs(1) / max_per_second.get())
    }

    pub fn from_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep for one interval.
    pub async fn acquire(&self) {
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "Throttling call");
        tokio::time::sleep(self.interval).await;
    }

    /// Sleep for one interval, then run `operation` and return its output unchanged.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire().await;
        operation().await
    }
}
