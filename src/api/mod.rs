//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /api/ping` - Liveness check
//! - `GET /api/time` - Server time
//! - `GET /api/stats` - Cache and rate-limiter statistics
//! - `GET /api/stocks/search?q=` - Instrument search
//! - `GET /api/stocks/quote?symbol=` - Latest quote

pub mod handlers;
pub mod headers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
