//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: Drops expired cache entries and ended rate-limit windows

mod sweep;

pub use sweep::spawn_sweep_task;
