//! Stock Cache - A rate-limited, caching gateway for stock data
//!
//! Shields a slow, rate-limited upstream behind bounded TTL/LRU caches and a
//! per-client fixed-window rate limiter.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use gateway::{Fetched, Freshness, Gateway};
pub use tasks::spawn_sweep_task;
