//! Periodic sweep counters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepMetrics {
    pub runs: u64,
    pub activated: u64,
    pub completed: u64,
    pub purged_steps: u64,
    /// Items that failed inside a sweep.
    pub item_failures: u64,
}

impl SweepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_activation(&mut self, activated: usize, failed: usize) {
        self.runs += 1;
        self.activated += activated as u64;
        self.item_failures += failed as u64;
    }

    pub fn record_completion(&mut self, completed: usize, failed: usize) {
        self.runs += 1;
        self.completed += completed as u64;
        self.item_failures += failed as u64;
    }

    pub fn record_retention(&mut self, purged: usize) {
        self.runs += 1;
        self.purged_steps += purged as u64;
    }
}
