//! Email delivery counters.

use serde::{Deserialize, Serialize};

use storesync_core::models::BatchReport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailMetrics {
    pub batches: u64,
    pub sent: u64,
    pub failed: u64,
    pub test_sends: u64,
}

impl EmailMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch(&mut self, report: &BatchReport) {
        self.batches += 1;
        self.sent += report.sent as u64;
        self.failed += report.failed as u64;
    }

    pub fn record_test_send(&mut self) {
        self.test_sends += 1;
    }

    pub fn delivery_rate(&self) -> f64 {
        let attempted = self.sent + self.failed;
        if attempted == 0 {
            0.0
        } else {
            self.sent as f64 / attempted as f64
        }
    }
}
