//! Cache Entry Module
//!
//! Defines a single cached value together with its write timestamp.

use std::time::Duration;

// == Cache Entry ==
/// A cached value and the time it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp (Unix milliseconds)
    pub inserted_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    ///
    /// A clock that moved backwards yields an age of zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at)
    }

    /// Same as [`age_ms`](Self::age_ms), as a `Duration`.
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.age_ms(now_ms))
    }

    // == Is Expired ==
    /// Checks whether the entry is stale for the given TTL.
    ///
    /// Boundary condition: an entry whose age equals the TTL is already
    /// expired, so a TTL of zero makes every read a miss.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }
}
