//! Yahoo Finance client
//!
//! Implements [`QuoteSource`] against Yahoo's public JSON endpoints.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::QuoteSource;
use crate::error::UpstreamError;
use crate::models::{Quote, SearchItem};

/// Results requested per search
const SEARCH_QUOTES_COUNT: &str = "10";

// == Yahoo Finance ==
/// HTTP client for Yahoo Finance.
#[derive(Debug, Clone)]
pub struct YahooFinance {
    http: reqwest::Client,
    base_url: String,
}

impl YahooFinance {
    /// Creates a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock_cache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QuoteSource for YahooFinance {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, UpstreamError> {
        debug!(query, "Searching upstream");

        let envelope: SearchEnvelope = self
            .http
            .get(format!("{}/v1/finance/search", self.base_url))
            .query(&[
                ("q", query),
                ("quotesCount", SEARCH_QUOTES_COUNT),
                ("newsCount", "0"),
                ("enableFuzzyQuery", "true"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(into_search_items(envelope.quotes))
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, UpstreamError> {
        debug!(symbol, "Fetching upstream quote");

        let response = self
            .http
            .get(format!("{}/v7/finance/quote", self.base_url))
            .query(&[("symbols", symbol)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(symbol.to_string()));
        }

        let envelope: QuoteEnvelope = response.error_for_status()?.json().await?;
        first_quote(envelope, symbol)
    }
}

// == Wire Formats ==
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<RawSearchQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "exchDisp")]
    exch_disp: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
    #[serde(rename = "typeDisp")]
    type_disp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResult,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    #[serde(default)]
    result: Vec<RawQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: String,
    short_name: Option<String>,
    long_name: Option<String>,
    currency: Option<String>,
    market_state: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    /// Unix seconds
    regular_market_time: Option<i64>,
}

impl From<RawQuote> for Quote {
    fn from(raw: RawQuote) -> Self {
        Quote {
            symbol: raw.symbol,
            short_name: raw.short_name,
            long_name: raw.long_name,
            currency: raw.currency,
            market_state: raw.market_state,
            price: raw.regular_market_price,
            change: raw.regular_market_change,
            change_percent: raw.regular_market_change_percent,
            previous_close: raw.regular_market_previous_close,
            open: raw.regular_market_open,
            high: raw.regular_market_day_high,
            low: raw.regular_market_day_low,
            time: raw
                .regular_market_time
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

// == Mapping ==
/// Keeps tradable instruments and flattens Yahoo's optional fields.
fn into_search_items(quotes: Vec<RawSearchQuote>) -> Vec<SearchItem> {
    quotes
        .into_iter()
        .filter(is_listed_instrument)
        .filter_map(|raw| {
            let symbol = non_empty(raw.symbol)?;
            Some(SearchItem {
                symbol,
                shortname: raw.shortname.unwrap_or_default(),
                longname: raw.longname.unwrap_or_default(),
                exchange: non_empty(raw.exchange)
                    .or_else(|| non_empty(raw.exch_disp))
                    .unwrap_or_default(),
                kind: non_empty(raw.quote_type)
                    .or_else(|| non_empty(raw.type_disp))
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn is_listed_instrument(raw: &RawSearchQuote) -> bool {
    let has_symbol = raw.symbol.as_deref().is_some_and(|s| !s.is_empty());
    let tradable = matches!(raw.quote_type.as_deref(), Some("EQUITY") | Some("ETF"))
        || raw.type_disp.as_deref().is_some_and(|s| !s.is_empty());
    has_symbol && tradable
}

fn first_quote(envelope: QuoteEnvelope, symbol: &str) -> Result<Quote, UpstreamError> {
    envelope
        .quote_response
        .result
        .into_iter()
        .next()
        .map(Quote::from)
        .ok_or_else(|| UpstreamError::NotFound(symbol.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filters_and_maps() {
        let body = r#"{
            "quotes": [
                {"symbol": "AAPL", "shortname": "Apple Inc.", "longname": "Apple Inc.",
                 "exchange": "NMS", "quoteType": "EQUITY"},
                {"symbol": "SPY", "shortname": "SPDR S&P 500", "exchange": "",
                 "exchDisp": "NYSEArca", "quoteType": "ETF"},
                {"symbol": "AAPL240119C00100000", "quoteType": "OPTION"},
                {"symbol": "BTC-USD", "quoteType": "CRYPTOCURRENCY", "typeDisp": "Cryptocurrency"},
                {"shortname": "No symbol", "quoteType": "EQUITY"}
            ]
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();

        let items = into_search_items(envelope.quotes);

        let symbols: Vec<&str> = items.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "SPY", "BTC-USD"]);
        assert_eq!(items[1].exchange, "NYSEArca");
        assert_eq!(items[1].longname, "");
        assert_eq!(items[2].kind, "CRYPTOCURRENCY");
    }

    #[test]
    fn test_search_without_quotes_is_empty() {
        let envelope: SearchEnvelope = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(into_search_items(envelope.quotes).is_empty());
    }

    #[test]
    fn test_quote_mapping() {
        let body = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "AAPL", "shortName": "Apple Inc.", "currency": "USD",
                    "marketState": "REGULAR", "regularMarketPrice": 189.5,
                    "regularMarketChange": -1.2, "regularMarketChangePercent": -0.63,
                    "regularMarketPreviousClose": 190.7, "regularMarketOpen": 190.0,
                    "regularMarketDayHigh": 191.0, "regularMarketDayLow": 188.9,
                    "regularMarketTime": 1700000000
                }],
                "error": null
            }
        }"#;
        let envelope: QuoteEnvelope = serde_json::from_str(body).unwrap();

        let quote = first_quote(envelope, "AAPL").unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, Some(189.5));
        assert_eq!(quote.high, Some(191.0));
        assert_eq!(quote.long_name, None);
        assert_eq!(quote.time.as_deref(), Some("2023-11-14T22:13:20.000Z"));
    }

    #[test]
    fn test_quote_empty_result_is_not_found() {
        let envelope: QuoteEnvelope =
            serde_json::from_str(r#"{"quoteResponse": {"result": []}}"#).unwrap();

        let err = first_quote(envelope, "ZZZZ").unwrap_err();
        assert_eq!(err, UpstreamError::NotFound("ZZZZ".to_string()));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = YahooFinance::new("http://localhost:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transient() {
        let client = YahooFinance::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

        let err = client.quote("AAPL").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transient(_)));
    }
}
