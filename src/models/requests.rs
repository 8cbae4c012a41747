//! Request DTOs for the gateway API
//!
//! Defines the query strings accepted by the stock endpoints.

use serde::Deserialize;

/// Query string for `GET /api/stocks/search`
///
/// A missing `q` is treated like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Query string for `GET /api/stocks/quote`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteParams {
    #[serde(default)]
    pub symbol: String,
}
