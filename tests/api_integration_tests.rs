//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a scripted
//! upstream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use stock_cache::{
    api::create_router,
    error::UpstreamError,
    models::{Quote, SearchItem},
    upstream::QuoteSource,
    AppState, Config,
};
use tower::ServiceExt;

// == Scripted Upstream ==

#[derive(Default)]
struct ScriptedSource {
    search_calls: AtomicUsize,
    quote_calls: AtomicUsize,
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, UpstreamError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if query == "explode" {
            return Err(UpstreamError::Transient("connection reset".to_string()));
        }
        Ok(vec![SearchItem {
            symbol: "AAPL".to_string(),
            shortname: "Apple Inc.".to_string(),
            longname: "Apple Inc.".to_string(),
            exchange: "NMS".to_string(),
            kind: "EQUITY".to_string(),
        }])
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, UpstreamError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        match symbol {
            "NOPE" => Err(UpstreamError::NotFound(symbol.to_string())),
            "FLAKY" => Err(UpstreamError::Transient("timeout".to_string())),
            _ => {
                let mut quote = Quote::with_price(symbol, 189.5);
                quote.change_percent = Some(-0.5);
                Ok(quote)
            }
        }
    }
}

// == Helper Functions ==

fn test_state(max_requests: u32) -> (AppState, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::default());
    let config = Config {
        rate_limit_max_requests: max_requests,
        ..Config::default()
    };
    let state = AppState::from_config(&config, source.clone()).unwrap();
    (state, source)
}

fn app_for(state: AppState, ip: [u8; 4]) -> Router {
    create_router(state).layer(MockConnectInfo(SocketAddr::from((ip, 40_000))))
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn header_str<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// == Ping / Time ==

#[tokio::test]
async fn test_ping_endpoint() {
    let (state, _) = test_state(10);
    let app = app_for(state, [127, 0, 0, 1]);

    let response = get(&app, "/api/ping").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["msg"], "pong");
}

#[tokio::test]
async fn test_time_endpoint() {
    let (state, _) = test_state(10);
    let app = app_for(state, [127, 0, 0, 1]);

    let response = get(&app, "/api/time").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["time"].as_str().is_some());
}

// == Search Endpoint ==

#[tokio::test]
async fn test_search_miss_then_hit() {
    let (state, source) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let first = get(&app, "/api/stocks/search?q=apple").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header_str(&first, "x-cache"), Some("MISS"));
    assert_eq!(header_str(&first, "x-ratelimit-limit"), Some("10"));
    assert_eq!(header_str(&first, "x-ratelimit-remaining"), Some("9"));
    assert!(header_str(&first, "x-ratelimit-reset").is_some());

    let json = body_to_json(first.into_body()).await;
    assert_eq!(json["items"][0]["symbol"], "AAPL");
    assert_eq!(json["items"][0]["type"], "EQUITY");

    let second = get(&app, "/api/stocks/search?q=apple").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header_str(&second, "x-cache"), Some("HIT"));
    assert!(second.headers().contains_key(header::AGE));

    assert_eq!(source.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_empty_query() {
    let (state, source) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/search?q=%20%20").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "x-cache"), Some("SKIP"));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_upstream_failure() {
    let (state, source) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/search?q=explode").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "search_failed");
    assert!(json["message"].as_str().unwrap().contains("connection reset"));

    // Failures are not cached, so the next request goes upstream again
    let retry = get(&app, "/api/stocks/search?q=explode").await;
    assert_eq!(retry.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 2);
}

// == Quote Endpoint ==

#[tokio::test]
async fn test_quote_payload() {
    let (state, _) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/quote?symbol=aapl").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["symbol"], "AAPL");
    assert_eq!(json["price"], 189.5);
    assert_eq!(json["changePercent"], -0.5);
    assert!(json["time"].is_null());
}

#[tokio::test]
async fn test_quote_symbol_normalized_into_one_entry() {
    let (state, source) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    get(&app, "/api/stocks/quote?symbol=msft").await;
    let second = get(&app, "/api/stocks/quote?symbol=%20MSFT%20").await;

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header_str(&second, "x-cache"), Some("HIT"));
    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_quote_missing_symbol() {
    let (state, source) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/quote?symbol=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "missing_symbol");
    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_quote_not_found() {
    let (state, _) = test_state(10);
    let app = app_for(state, [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/quote?symbol=nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_quote_transient_failure() {
    let (state, _) = test_state(10);
    let app = app_for(state.clone(), [10, 0, 0, 1]);

    let response = get(&app, "/api/stocks/quote?symbol=flaky").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "quote_failed");
    assert!(state.gateway.quote_cache().is_empty());
}

// == Rate Limiting ==

#[tokio::test]
async fn test_rate_limit_rejects_with_429() {
    let (state, source) = test_state(2);
    let app = app_for(state, [10, 0, 0, 7]);

    for _ in 0..2 {
        let response = get(&app, "/api/stocks/quote?symbol=AAPL").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(&app, "/api/stocks/quote?symbol=AAPL").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header_str(&response, "x-ratelimit-remaining"), Some("0"));

    let retry_after: u64 = header_str(&response, "retry-after")
        .and_then(|v| v.parse().ok())
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "rate_limited");

    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let (state, _) = test_state(1);
    let alice = app_for(state.clone(), [10, 0, 0, 1]);
    let bob = app_for(state, [10, 0, 0, 2]);

    assert_eq!(get(&alice, "/api/stocks/search?q=a").await.status(), StatusCode::OK);
    assert_eq!(
        get(&alice, "/api/stocks/search?q=a").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    assert_eq!(get(&bob, "/api/stocks/search?q=a").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unlimited_endpoints_do_not_count() {
    let (state, _) = test_state(1);
    let app = app_for(state, [10, 0, 0, 1]);

    for _ in 0..5 {
        assert_eq!(get(&app, "/api/ping").await.status(), StatusCode::OK);
        assert_eq!(get(&app, "/api/stats").await.status(), StatusCode::OK);
    }

    assert_eq!(get(&app, "/api/stocks/quote?symbol=AAPL").await.status(), StatusCode::OK);
}

// == Stats Endpoint ==

#[tokio::test]
async fn test_stats_reflect_activity() {
    let (state, _) = test_state(2);
    let app = app_for(state, [10, 0, 0, 1]);

    get(&app, "/api/stocks/quote?symbol=AAPL").await;
    get(&app, "/api/stocks/quote?symbol=AAPL").await;
    get(&app, "/api/stocks/quote?symbol=AAPL").await;

    let response = get(&app, "/api/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["quote_cache"]["hits"], 1);
    assert_eq!(json["quote_cache"]["misses"], 1);
    assert_eq!(json["quote_cache"]["total_entries"], 1);
    assert_eq!(json["quote_cache"]["hit_rate"], 0.5);
    assert_eq!(json["search_cache"]["total_entries"], 0);
    assert_eq!(json["rate_limiter"]["allowed"], 2);
    assert_eq!(json["rate_limiter"]["rejected"], 1);
    assert_eq!(json["rate_limiter"]["tracked_clients"], 1);
}
