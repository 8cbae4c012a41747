//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    ping_handler, quote_handler, search_handler, stats_handler, time_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/ping` - Liveness check
/// - `GET /api/time` - Server time
/// - `GET /api/stats` - Cache and rate-limiter statistics
/// - `GET /api/stocks/search?q=` - Instrument search (rate limited, cached)
/// - `GET /api/stocks/quote?symbol=` - Latest quote (rate limited, cached)
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
///
/// Client identity comes from `ConnectInfo<SocketAddr>`, so serve the router
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ping", get(ping_handler))
        .route("/api/time", get(time_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/stocks/search", get(search_handler))
        .route("/api/stocks/quote", get(quote_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
