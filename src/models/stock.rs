//! Stock data models
//!
//! Payloads produced by the upstream source, cached, and served to clients.

use serde::{Deserialize, Serialize};

/// One match from a symbol search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub symbol: String,
    pub shortname: String,
    pub longname: String,
    pub exchange: String,
    /// Instrument type, e.g. `EQUITY` or `ETF`
    #[serde(rename = "type")]
    pub kind: String,
}

/// Latest market quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Time of the last trade (RFC 3339)
    pub time: Option<String>,
}

impl Quote {
    /// A quote carrying only a symbol and price.
    pub fn with_price(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            short_name: None,
            long_name: None,
            currency: None,
            market_state: None,
            price: Some(price),
            change: None,
            change_percent: None,
            previous_close: None,
            open: None,
            high: None,
            low: None,
            time: None,
        }
    }
}
