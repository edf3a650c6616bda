//! # storesync-observability
//!
//! Structured tracing (subscriber setup, span definitions, log events) and
//! in-process metrics for tasks, sweeps, generation, and email delivery.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::MetricsCollector;
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
