//! Fixed-Window Rate Limiter Module
//!
//! Admits or rejects requests per client key using fixed time windows.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{duration_ms, system_clock, SharedClock};
use crate::error::ConfigError;
use crate::limiter::{Decision, LimiterStats, WindowState};

#[derive(Debug, Default)]
struct Inner {
    windows: HashMap<String, WindowState>,
    allowed: u64,
    rejected: u64,
}

// == Rate Limiter ==
/// Per-client fixed-window request counter.
///
/// Every call counts against the window, admitted or not. A window that has
/// ended is replaced by one starting at the current call, as part of that
/// call. Counting is fixed-window, so up to twice the limit can pass across
/// a window seam.
#[derive(Debug)]
pub struct RateLimiter {
    inner: Mutex<Inner>,
    window_ms: u64,
    max_requests: u32,
    clock: SharedClock,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter admitting `max_requests` per `window` per client.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the window is shorter than a millisecond
    /// or `max_requests` is zero.
    pub fn new(window: Duration, max_requests: u32) -> Result<Self, ConfigError> {
        Self::with_clock(window, max_requests, system_clock())
    }

    /// Creates a limiter that reads time from `clock`.
    pub fn with_clock(
        window: Duration,
        max_requests: u32,
        clock: SharedClock,
    ) -> Result<Self, ConfigError> {
        let window_ms = duration_ms(window);
        if window_ms == 0 {
            return Err(ConfigError::InvalidWindow(window));
        }
        if max_requests == 0 {
            return Err(ConfigError::InvalidLimit(max_requests));
        }

        Ok(Self {
            inner: Mutex::new(Inner::default()),
            window_ms,
            max_requests,
            clock,
        })
    }

    // == Check ==
    /// Counts a request for `client` and decides whether it is admitted.
    ///
    /// The read, reset and increment happen under one lock, so concurrent
    /// checks for the same client each see a distinct count.
    pub fn check(&self, client: &str) -> Decision {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let window = inner
            .windows
            .entry(client.to_string())
            .or_insert_with(|| WindowState::open(now, self.window_ms));
        let count = window.record(now, self.window_ms);
        let decision = Decision::new(self.max_requests, count, window.reset_at, now);

        if decision.allowed {
            inner.allowed += 1;
        } else {
            inner.rejected += 1;
        }

        debug!(
            client,
            count,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "Rate limit check"
        );
        decision
    }

    // == Purge Idle ==
    /// Drops windows that have ended.
    ///
    /// An ended window is replaced on the client's next check anyway, so
    /// dropping it does not change any decision. Returns the number dropped.
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let before = inner.windows.len();
        inner.windows.retain(|_, window| !window.is_elapsed(now));
        before - inner.windows.len()
    }

    // == Stats ==
    pub fn stats(&self) -> LimiterStats {
        let inner = self.inner.lock();
        LimiterStats {
            tracked_clients: inner.windows.len(),
            allowed: inner.allowed,
            rejected: inner.rejected,
            limit: self.max_requests,
            window_secs: self.window().as_secs_f64(),
        }
    }

    /// Number of clients with a window in memory.
    pub fn tracked_clients(&self) -> usize {
        self.inner.lock().windows.len()
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}
