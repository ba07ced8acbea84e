//! Politeness throttle for outbound requests
//!
//! The harvester is strictly sequential, so throttling is a flat pause before
//! each request rather than a token bucket. The pause does not adapt to how
//! long the previous request took.

use std::time::Duration;
use tokio::time::sleep;

/// Enforces a fixed pause before every outbound request but the first
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    requests: u64,
}

impl RateLimiter {
    /// Creates a limiter pausing `delay` between requests
    pub fn new(delay: Duration) -> Self {
        Self { delay, requests: 0 }
    }

    /// Creates a limiter from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Waits until the next request may be sent
    ///
    /// The first call returns immediately; every later call sleeps the full
    /// configured delay.
    pub async fn wait(&mut self) {
        if self.requests > 0 && !self.delay.is_zero() {
            tracing::trace!("Pausing {:?} before next request", self.delay);
            sleep(self.delay).await;
        }
        self.requests += 1;
    }

    /// Number of requests let through so far
    pub fn requests(&self) -> u64 {
        self.requests
    }
}
