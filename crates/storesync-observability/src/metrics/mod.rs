//! Central metrics registry.
//!
//! [`MetricsCollector`] owns all domain-specific metric collectors and provides
//! a unified interface for recording and querying metrics.

pub mod email_metrics;
pub mod generation_metrics;
pub mod sweep_metrics;
pub mod task_metrics;

pub use email_metrics::EmailMetrics;
pub use generation_metrics::GenerationMetrics;
pub use sweep_metrics::SweepMetrics;
pub use task_metrics::TaskMetrics;

/// Central metrics registry that owns all domain-specific collectors.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsCollector {
    pub tasks: TaskMetrics,
    pub sweeps: SweepMetrics,
    pub generation: GenerationMetrics,
    pub email: EmailMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics (useful for testing or periodic rotation).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
