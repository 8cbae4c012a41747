//! Rate Limiter Module
//!
//! Per-client fixed-window admission control.

mod decision;
mod fixed_window;
mod window;

pub use decision::{Decision, LimiterStats};
pub use fixed_window::RateLimiter;
pub use window::WindowState;
