//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::models::SearchItem;

/// Response body for `GET /api/stocks/search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
}

impl SearchResponse {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self { items }
    }
}

/// Response body for `GET /api/ping`
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub msg: String,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            ok: true,
            msg: "pong".to_string(),
        }
    }
}

/// Response body for `GET /api/time`
#[derive(Debug, Clone, Serialize)]
pub struct TimeResponse {
    /// Current server time in RFC 3339 format
    pub time: String,
}

impl TimeResponse {
    pub fn now() -> Self {
        Self {
            time: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_serialize() {
        let resp = SearchResponse::new(Vec::new());
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"items":[]}"#);
    }

    #[test]
    fn test_ping_response_serialize() {
        let json = serde_json::to_value(PingResponse::pong()).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["msg"], "pong");
    }

    #[test]
    fn test_time_response_is_rfc3339() {
        let resp = TimeResponse::now();
        assert!(chrono::DateTime::parse_from_rfc3339(&resp.time).is_ok());
    }
}
