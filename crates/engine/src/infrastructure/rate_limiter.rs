//! Fixed-window request budget for the queued path.

use std::time::Duration;

/// Length of one rate window.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Requests allowed per window unless configured otherwise.
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 60;

/// Counter plus accumulated time, advanced only by host ticks.
///
/// The window resets once at least [`RATE_WINDOW`] has accumulated. Leftover
/// time past the boundary is discarded, not carried into the next window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiter {
    capacity: u32,
    requests_in_window: u32,
    elapsed: Duration,
}

impl RateLimiter {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            requests_in_window: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns `true` when the window rolled over.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(elapsed);
        if self.elapsed >= RATE_WINDOW {
            self.elapsed = Duration::ZERO;
            self.requests_in_window = 0;
            return true;
        }
        false
    }

    pub fn can_make_request(&self) -> bool {
        self.requests_in_window < self.capacity
    }

    pub fn record_request(&mut self) {
        self.requests_in_window = self.requests_in_window.saturating_add(1);
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn requests_in_window(&self) -> u32 {
        self.requests_in_window
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_WINDOW)
    }
}
