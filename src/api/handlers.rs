//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    Json,
};

use super::headers::{cache_headers, rate_limit_headers};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::gateway::{Fetched, Gateway, GatewayStats};
use crate::models::{
    PingResponse, Quote, QuoteParams, SearchParams, SearchResponse, TimeResponse,
};
use crate::upstream::QuoteSource;

/// Client key used when the peer address is unavailable
const UNKNOWN_CLIENT: &str = "unknown";

/// Application state shared across all handlers.
///
/// The gateway synchronizes internally, so handlers share it through a
/// plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Creates a new AppState around the given gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn QuoteSource>,
    ) -> std::result::Result<Self, ConfigError> {
        Gateway::from_config(config, source).map(Self::new)
    }
}

/// Rate-limit identity of the caller: its IP address.
fn client_key(connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn fetched_headers<T>(fetched: &Fetched<T>) -> HeaderMap {
    let mut headers = rate_limit_headers(&fetched.rate);
    headers.extend(cache_headers(&fetched.freshness));
    headers
}

/// Handler for GET /api/stocks/search?q=
pub async fn search_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Query(params): Query<SearchParams>,
) -> Result<(HeaderMap, Json<SearchResponse>)> {
    let client = client_key(connect_info);
    let fetched = state.gateway.search(&client, &params.q).await?;

    Ok((fetched_headers(&fetched), Json(SearchResponse::new(fetched.value))))
}

/// Handler for GET /api/stocks/quote?symbol=
pub async fn quote_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Query(params): Query<QuoteParams>,
) -> Result<(HeaderMap, Json<Quote>)> {
    let client = client_key(connect_info);
    let fetched = state.gateway.quote(&client, &params.symbol).await?;

    Ok((fetched_headers(&fetched), Json(fetched.value)))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<GatewayStats> {
    Json(state.gateway.stats())
}

/// Handler for GET /api/ping
pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse::pong())
}

/// Handler for GET /api/time
pub async fn time_handler() -> Json<TimeResponse> {
    Json(TimeResponse::now())
}
