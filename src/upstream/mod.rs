//! Upstream Module
//!
//! The slow, rate-limited data source the gateway shields.

mod yahoo;

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::models::{Quote, SearchItem};

pub use yahoo::YahooFinance;

// == Quote Source ==
/// Interface to the upstream market-data provider.
///
/// Implementations may be slow and may fail; the gateway only distinguishes
/// success, [`UpstreamError::NotFound`] and [`UpstreamError::Transient`].
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Searches instruments by name or ticker.
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, UpstreamError>;

    /// Fetches the latest quote for an upper-cased symbol.
    async fn quote(&self, symbol: &str) -> Result<Quote, UpstreamError>;
}
