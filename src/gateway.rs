//! Gateway Module
//!
//! Puts the rate limiter and the two caches in front of the upstream source.
//!
//! Each request is checked against the client's rate-limit window before
//! any other work. Admitted requests are served from cache when fresh,
//! otherwise fetched once from upstream and cached on success. Failed
//! fetches are never cached. Concurrent misses on the same key each fetch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{BoundedCache, CacheStats};
use crate::clock::{duration_ms, system_clock, SharedClock};
use crate::config::Config;
use crate::error::{ConfigError, GatewayError, Result, UpstreamError};
use crate::limiter::{Decision, LimiterStats, RateLimiter};
use crate::models::{Quote, SearchItem};
use crate::upstream::QuoteSource;

// == Freshness ==
/// Where a served value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served from cache, written `age` ago
    Cached { age: Duration },
    /// Fetched from upstream for this request
    Fetched,
    /// Neither cache nor upstream was consulted
    Skipped,
}

// == Fetched ==
/// A value served by the gateway with its provenance and rate-limit state.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub freshness: Freshness,
    pub rate: Decision,
}

// == Stats ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayStats {
    pub search_cache: CacheStats,
    pub quote_cache: CacheStats,
    pub rate_limiter: LimiterStats,
}

/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub search_entries: usize,
    pub quote_entries: usize,
    pub idle_clients: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.search_entries + self.quote_entries + self.idle_clients
    }
}

// == Gateway ==
/// Rate-limited, caching front for a [`QuoteSource`].
pub struct Gateway {
    search_cache: BoundedCache<String, Vec<SearchItem>>,
    quote_cache: BoundedCache<String, Quote>,
    limiter: RateLimiter,
    source: Arc<dyn QuoteSource>,
}

impl Gateway {
    // == Constructor ==
    /// Builds a gateway from configuration using the system clock.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a zero cache capacity, window or limit.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn QuoteSource>,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_clock(config, source, system_clock())
    }

    /// Builds a gateway whose caches and limiter share `clock`.
    pub fn with_clock(
        config: &Config,
        source: Arc<dyn QuoteSource>,
        clock: SharedClock,
    ) -> std::result::Result<Self, ConfigError> {
        let search_cache = BoundedCache::with_clock(
            config.search_cache_max_entries,
            Duration::from_secs(config.search_cache_ttl),
            clock.clone(),
        )?;
        let quote_cache = BoundedCache::with_clock(
            config.quote_cache_max_entries,
            Duration::from_secs(config.quote_cache_ttl),
            clock.clone(),
        )?;
        let limiter = RateLimiter::with_clock(
            Duration::from_secs(config.rate_limit_window),
            config.rate_limit_max_requests,
            clock,
        )?;

        Ok(Self::from_parts(search_cache, quote_cache, limiter, source))
    }

    /// Assembles a gateway from already-built components.
    pub fn from_parts(
        search_cache: BoundedCache<String, Vec<SearchItem>>,
        quote_cache: BoundedCache<String, Quote>,
        limiter: RateLimiter,
        source: Arc<dyn QuoteSource>,
    ) -> Self {
        Self {
            search_cache,
            quote_cache,
            limiter,
            source,
        }
    }

    // == Search ==
    /// Searches instruments on behalf of `client`.
    ///
    /// The query is trimmed and otherwise used verbatim as the cache key.
    /// An empty query yields no results without touching cache or upstream.
    pub async fn search(&self, client: &str, query: &str) -> Result<Fetched<Vec<SearchItem>>> {
        let rate = self.admit(client)?;

        let query = query.trim();
        if query.is_empty() {
            return Ok(Fetched {
                value: Vec::new(),
                freshness: Freshness::Skipped,
                rate,
            });
        }

        let source = &self.source;
        let (value, freshness) =
            read_through(&self.search_cache, query.to_string(), || source.search(query))
                .await
                .map_err(GatewayError::Search)?;

        Ok(Fetched {
            value,
            freshness,
            rate,
        })
    }

    // == Quote ==
    /// Fetches a quote on behalf of `client`.
    ///
    /// The symbol is trimmed and upper-cased before lookup.
    pub async fn quote(&self, client: &str, symbol: &str) -> Result<Fetched<Quote>> {
        let rate = self.admit(client)?;

        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(GatewayError::InvalidRequest("symbol is required".to_string()));
        }

        let source = &self.source;
        let (value, freshness) =
            read_through(&self.quote_cache, symbol.clone(), || source.quote(&symbol))
                .await
                .map_err(GatewayError::Quote)?;

        Ok(Fetched {
            value,
            freshness,
            rate,
        })
    }

    // == Maintenance ==
    /// Eagerly drops expired cache entries and ended rate-limit windows.
    pub fn purge_expired(&self) -> SweepReport {
        SweepReport {
            search_entries: self.search_cache.purge_expired(),
            quote_entries: self.quote_cache.purge_expired(),
            idle_clients: self.limiter.purge_idle(),
        }
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            search_cache: self.search_cache.stats(),
            quote_cache: self.quote_cache.stats(),
            rate_limiter: self.limiter.stats(),
        }
    }

    pub fn search_cache(&self) -> &BoundedCache<String, Vec<SearchItem>> {
        &self.search_cache
    }

    pub fn quote_cache(&self) -> &BoundedCache<String, Quote> {
        &self.quote_cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn admit(&self, client: &str) -> Result<Decision> {
        let decision = self.limiter.check(client);
        if decision.allowed {
            Ok(decision)
        } else {
            warn!(
                client,
                count = decision.count,
                limit = decision.limit,
                "Rate limit exceeded"
            );
            Err(GatewayError::RateLimited(decision))
        }
    }
}

// == Read Through ==
/// Serves `key` from `cache`, or calls `fetch` once and caches its success.
async fn read_through<V, F, Fut>(
    cache: &BoundedCache<String, V>,
    key: String,
    fetch: F,
) -> std::result::Result<(V, Freshness), UpstreamError>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<V, UpstreamError>>,
{
    if let Some(hit) = cache.lookup(&key) {
        debug!(key = %key, age_ms = duration_ms(hit.age), "Cache hit");
        return Ok((hit.value, Freshness::Cached { age: hit.age }));
    }

    debug!(key = %key, "Cache miss, fetching upstream");
    match fetch().await {
        Ok(value) => {
            cache.put(key, value.clone());
            Ok((value, Freshness::Fetched))
        }
        Err(err) => {
            match &err {
                UpstreamError::NotFound(_) => info!(key = %key, "Upstream has no data"),
                UpstreamError::Transient(reason) => {
                    warn!(key = %key, %reason, "Upstream fetch failed")
                }
            }
            Err(err)
        }
    }
}
