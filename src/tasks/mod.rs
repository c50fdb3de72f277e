//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stats Report: Logs a cache statistics snapshot at configured intervals

mod stats_report;

pub use stats_report::{log_stats, spawn_stats_task};
