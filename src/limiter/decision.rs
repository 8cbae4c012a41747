//! Rate Limit Decision Module
//!
//! The outcome of a single admission check, plus limiter-wide counters.

use std::time::Duration;

use serde::Serialize;

use crate::clock::duration_ms;

// == Decision ==
/// Result of checking one request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Attempts counted in the current window, including this one
    pub count: u64,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends (Unix milliseconds)
    pub reset_at: u64,
    /// Time until the current window ends
    pub retry_after: Duration,
}

impl Decision {
    /// Builds a decision from the post-increment count.
    pub fn new(limit: u32, count: u64, reset_at: u64, now_ms: u64) -> Self {
        let remaining = u64::from(limit).saturating_sub(count) as u32;
        Self {
            allowed: count <= u64::from(limit),
            limit,
            count,
            remaining,
            reset_at,
            retry_after: Duration::from_millis(reset_at.saturating_sub(now_ms)),
        }
    }

    /// Window end as Unix seconds, rounded up.
    pub fn reset_at_secs(&self) -> u64 {
        self.reset_at.div_ceil(1000)
    }

    /// Seconds a rejected client should wait, rounded up and at least one.
    pub fn retry_after_secs(&self) -> u64 {
        duration_ms(self.retry_after).div_ceil(1000).max(1)
    }
}

// == Limiter Stats ==
/// Counters across all clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LimiterStats {
    /// Clients with a window currently held in memory
    pub tracked_clients: usize,
    /// Requests admitted since start
    pub allowed: u64,
    /// Requests rejected since start
    pub rejected: u64,
    /// Requests allowed per window
    pub limit: u32,
    /// Window length in seconds
    pub window_secs: f64,
}
