//! Request, response and market-data models
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP bodies and upstream payloads.

pub mod requests;
pub mod responses;
pub mod stock;

// Re-export commonly used types
pub use requests::{QuoteParams, SearchParams};
pub use responses::{PingResponse, SearchResponse, TimeResponse};
pub use stock::{Quote, SearchItem};
