//! Response headers describing rate-limit and cache state.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::gateway::Freshness;

pub use crate::error::{
    rate_limit_headers, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};

/// `HIT`, `MISS` or `SKIP`
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Headers telling the client whether it got a cached value, and how old.
pub fn cache_headers(freshness: &Freshness) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match freshness {
        Freshness::Cached { age } => {
            headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
            headers.insert(header::AGE, HeaderValue::from(age.as_secs()));
        }
        Freshness::Fetched => {
            headers.insert(X_CACHE, HeaderValue::from_static("MISS"));
        }
        Freshness::Skipped => {
            headers.insert(X_CACHE, HeaderValue::from_static("SKIP"));
        }
    }
    headers
}
