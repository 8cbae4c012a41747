//! Error types for the stock cache gateway
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::limiter::Decision;

// == Config Error ==
/// Invalid construction parameters for a cache or the rate limiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cache capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("Rate limit window must be at least 1ms, got {0:?}")]
    InvalidWindow(Duration),

    #[error("Rate limit must admit at least 1 request per window, got {0}")]
    InvalidLimit(u32),
}

// == Upstream Error ==
/// Failure reported by the upstream data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream has no data for the requested symbol
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, timeout, bad status or undecodable body
    #[error("Upstream request failed: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transient(err.to_string())
    }
}

// == Gateway Error ==
/// Everything a gateway request can fail with.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The client used up its window
    #[error("Rate limit exceeded, retry in {}s", .0.retry_after_secs())]
    RateLimited(Decision),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Search fetch failed
    #[error("Search failed: {0}")]
    Search(#[source] UpstreamError),

    /// Quote fetch failed
    #[error("Quote failed: {0}")]
    Quote(#[source] UpstreamError),
}

impl GatewayError {
    /// Machine-readable code sent in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::RateLimited(_) => "rate_limited",
            GatewayError::InvalidRequest(_) => "missing_symbol",
            GatewayError::Search(UpstreamError::NotFound(_))
            | GatewayError::Quote(UpstreamError::NotFound(_)) => "not_found",
            GatewayError::Search(UpstreamError::Transient(_)) => "search_failed",
            GatewayError::Quote(UpstreamError::Transient(_)) => "quote_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Search(UpstreamError::NotFound(_))
            | GatewayError::Quote(UpstreamError::NotFound(_)) => StatusCode::NOT_FOUND,
            GatewayError::Search(UpstreamError::Transient(_))
            | GatewayError::Quote(UpstreamError::Transient(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        let mut response = (self.status(), body).into_response();

        if let GatewayError::RateLimited(decision) = &self {
            let headers = response.headers_mut();
            headers.extend(rate_limit_headers(decision));
            headers.insert(
                header::RETRY_AFTER,
                HeaderValue::from(decision.retry_after_secs()),
            );
        }

        response
    }
}

// == Rate Limit Headers ==
pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// Window end, Unix seconds
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Headers advertising the client's current rate-limit window.
///
/// Sent on admitted responses and on 429 rejections alike.
pub fn rate_limit_headers(decision: &Decision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_at_secs()));
    headers
}

// == Result Type Alias ==
/// Convenience Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
