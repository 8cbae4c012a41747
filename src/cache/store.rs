//! Bounded Cache Module
//!
//! Main cache engine combining a key index with LRU ordering and TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruList};
use crate::clock::{duration_ms, system_clock, SharedClock};
use crate::error::ConfigError;

// == Cache Hit ==
/// A value served from the cache along with how old it is.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<V> {
    pub value: V,
    pub age: Duration,
}

// == Inner State ==
/// Everything guarded by the cache lock.
#[derive(Debug)]
struct Inner<K, V> {
    /// Key to slot index in `order`
    index: HashMap<K, usize>,
    /// Recency order and entry storage
    order: LruList<K, V>,
    stats: CacheStats,
}

// == Bounded Cache ==
/// Capacity-bounded, recency-ordered key/value store with per-entry TTL.
///
/// Safe to share between tasks: every operation takes the internal lock
/// once and never suspends, so a `get` or `put` is atomic with respect to
/// recency order and size accounting.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    max_size: usize,
    ttl_ms: u64,
    clock: SharedClock,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries, each fresh for `ttl`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCapacity`] when `max_size` is zero.
    pub fn new(max_size: usize, ttl: Duration) -> Result<Self, ConfigError> {
        Self::with_clock(max_size, ttl, system_clock())
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(
        max_size: usize,
        ttl: Duration,
        clock: SharedClock,
    ) -> Result<Self, ConfigError> {
        if max_size < 1 {
            return Err(ConfigError::InvalidCapacity(max_size));
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                index: HashMap::with_capacity(max_size),
                order: LruList::with_capacity(max_size),
                stats: CacheStats::new(max_size),
            }),
            max_size,
            ttl_ms: duration_ms(ttl),
            clock,
        })
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` when the key is absent or its TTL has elapsed.
    /// Expired entries are removed and counted as misses.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).map(|hit| hit.value)
    }

    // == Lookup ==
    /// Like [`get`](Self::get), also reporting the entry's age.
    pub fn lookup<Q>(&self, key: &Q) -> Option<CacheHit<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let Some(&idx) = inner.index.get(key) else {
            inner.stats.record_miss();
            return None;
        };

        let (expired, age) = match inner.order.entry(idx) {
            Some(entry) => (entry.is_expired(now, self.ttl_ms), entry.age(now)),
            None => (true, Duration::ZERO),
        };

        if expired {
            inner.index.remove(key);
            inner.order.remove(idx);
            inner.stats.record_expirations(1);
            inner.stats.record_miss();
            inner.stats.set_total_entries(inner.order.len());
            return None;
        }

        inner.order.touch(idx);
        inner.stats.record_hit();
        inner
            .order
            .entry(idx)
            .map(|entry| CacheHit {
                value: entry.value.clone(),
                age,
            })
    }

    // == Put ==
    /// Stores a value, overwriting any previous value for the key.
    ///
    /// The entry's timestamp is reset and it becomes most recently used.
    /// Inserting a new key into a full cache evicts exactly one entry, the
    /// least recently used. Overwriting reuses the key's own slot.
    pub fn put(&self, key: K, value: V) {
        let now = self.clock.now_ms();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(&idx) = inner.index.get(&key) {
            if let Some(entry) = inner.order.entry_mut(idx) {
                *entry = CacheEntry::new(value, now);
            }
            inner.order.touch(idx);
            return;
        }

        if inner.order.len() >= self.max_size {
            if let Some((evicted, _)) = inner.order.pop_back() {
                inner.index.remove(&evicted);
                inner.stats.record_eviction();
                debug!("Cache full ({} entries), evicted least recently used entry", self.max_size);
            }
        }

        let idx = inner.order.push_front(key.clone(), CacheEntry::new(value, now));
        inner.index.insert(key, idx);
        inner.stats.set_total_entries(inner.order.len());
    }

    // == Remove ==
    /// Removes a key, returning whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let removed = inner
            .index
            .remove(key)
            .and_then(|idx| inner.order.remove(idx))
            .is_some();
        inner.stats.set_total_entries(inner.order.len());
        removed
    }

    // == Clear ==
    /// Removes all entries. Statistics counters are kept.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        guard.index.clear();
        guard.order.clear();
        guard.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl_ms;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let removed = inner.order.retain(|_, entry| !entry.is_expired(now, ttl_ms));
        for key in &removed {
            inner.index.remove(key);
        }

        inner.stats.record_expirations(removed.len());
        inner.stats.set_total_entries(inner.order.len());
        removed.len()
    }

    // == Keys ==
    /// Keys from least to most recently used. Expired entries are included.
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .lock()
            .order
            .iter_lru()
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let guard = self.inner.lock();
        let mut stats = guard.stats.clone();
        stats.set_total_entries(guard.order.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
