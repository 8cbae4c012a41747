//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default upstream endpoint
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Durations are in seconds.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of cached search results
    pub search_cache_max_entries: usize,
    /// How long a search result stays fresh
    pub search_cache_ttl: u64,
    /// Maximum number of cached quotes
    pub quote_cache_max_entries: usize,
    /// How long a quote stays fresh
    pub quote_cache_ttl: u64,
    /// Length of a rate-limit window
    pub rate_limit_window: u64,
    /// Requests each client may make per window
    pub rate_limit_max_requests: u32,
    /// Interval between background sweeps
    pub sweep_interval: u64,
    /// Base URL of the upstream data source
    pub upstream_base_url: String,
    /// Per-request upstream timeout
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SEARCH_CACHE_MAX_ENTRIES` - Cached search results (default: 500)
    /// - `SEARCH_CACHE_TTL` - Search result TTL (default: 3600)
    /// - `QUOTE_CACHE_MAX_ENTRIES` - Cached quotes (default: 1000)
    /// - `QUOTE_CACHE_TTL` - Quote TTL (default: 15)
    /// - `RATE_LIMIT_WINDOW` - Rate-limit window (default: 60)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per client per window (default: 60)
    /// - `SWEEP_INTERVAL` - Background sweep frequency (default: 30)
    /// - `UPSTREAM_BASE_URL` - Upstream endpoint (default: Yahoo Finance)
    /// - `UPSTREAM_TIMEOUT` - Upstream request timeout (default: 10)
    ///
    /// Values that fail to parse fall back to their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            search_cache_max_entries: env_or(
                "SEARCH_CACHE_MAX_ENTRIES",
                defaults.search_cache_max_entries,
            ),
            search_cache_ttl: env_or("SEARCH_CACHE_TTL", defaults.search_cache_ttl),
            quote_cache_max_entries: env_or(
                "QUOTE_CACHE_MAX_ENTRIES",
                defaults.quote_cache_max_entries,
            ),
            quote_cache_ttl: env_or("QUOTE_CACHE_TTL", defaults.quote_cache_ttl),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_base_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            search_cache_max_entries: 500,
            search_cache_ttl: 60 * 60,
            quote_cache_max_entries: 1000,
            quote_cache_ttl: 15,
            rate_limit_window: 60,
            rate_limit_max_requests: 60,
            sweep_interval: 30,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout: 10,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
