//! Background task outcomes, retries, and latency.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Counters for the task runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub retries: u64,
    pub timeouts: u64,
    /// Terminal outcomes per task kind: (succeeded, failed).
    pub by_kind: BTreeMap<String, (u64, u64)>,
    latency_samples_ms: Vec<u64>,
}

impl TaskMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&mut self) {
        self.submitted += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    pub fn record_timeout(&mut self) {
        self.timeouts += 1;
    }

    /// Record a terminal outcome and how long the task took end to end.
    pub fn record_finished(&mut self, kind: &str, success: bool, elapsed: Duration) {
        let entry = self.by_kind.entry(kind.to_string()).or_default();
        if success {
            self.succeeded += 1;
            entry.0 += 1;
        } else {
            self.failed += 1;
            entry.1 += 1;
        }
        self.latency_samples_ms.push(elapsed.as_millis() as u64);
        if self.latency_samples_ms.len() > MAX_LATENCY_SAMPLES {
            self.latency_samples_ms
                .drain(..self.latency_samples_ms.len() - MAX_LATENCY_SAMPLES);
        }
    }

    /// Tasks that have not reached a terminal state.
    pub fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.succeeded + self.failed)
    }

    /// Fraction of finished tasks that failed.
    pub fn failure_rate(&self) -> f64 {
        let finished = self.succeeded + self.failed;
        if finished == 0 {
            0.0
        } else {
            self.failed as f64 / finished as f64
        }
    }

    /// Task latency at the given percentile (0.0–1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.latency_samples_ms.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted = self.latency_samples_ms.clone();
        sorted.sort_unstable();
        let idx = ((p * (sorted.len() - 1) as f64).round() as usize).min(sorted.len() - 1);
        Duration::from_millis(sorted[idx])
    }
}
