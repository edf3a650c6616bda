use serde::{Deserialize, Serialize};

use super::defaults;

/// Task runner and periodic sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// Per-attempt budget.
    pub task_timeout_secs: u64,
    /// Interval between activation/completion sweeps.
    pub sweep_interval_secs: u64,
    pub retention_interval_secs: u64,
    pub approval_retention_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::DEFAULT_WORKER_COUNT,
            queue_capacity: defaults::DEFAULT_QUEUE_CAPACITY,
            max_retries: defaults::DEFAULT_TASK_MAX_RETRIES,
            retry_delay_secs: defaults::DEFAULT_TASK_RETRY_DELAY_SECS,
            task_timeout_secs: defaults::DEFAULT_TASK_TIMEOUT_SECS,
            sweep_interval_secs: defaults::DEFAULT_SWEEP_INTERVAL_SECS,
            retention_interval_secs: defaults::DEFAULT_RETENTION_INTERVAL_SECS,
            approval_retention_days: defaults::DEFAULT_APPROVAL_RETENTION_DAYS,
        }
    }
}
