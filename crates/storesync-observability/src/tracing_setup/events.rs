//! Structured log events for key runtime operations.
//!
//! Each function emits a `tracing` event with an `event` field for filtering.

/// Log a task reaching a terminal state.
pub fn task_finished(task_id: &str, kind: &str, status: &str, attempts: u32) {
    tracing::info!(
        event = "task_finished",
        task_id = %task_id,
        kind = %kind,
        status = %status,
        attempts = attempts,
        "task finished"
    );
}

/// Log a retry of a failed task attempt.
pub fn task_retry(task_id: &str, kind: &str, attempt: u32, error: &str) {
    tracing::warn!(
        event = "task_retry",
        task_id = %task_id,
        kind = %kind,
        attempt = attempt,
        error = %error,
        "retrying task"
    );
}

/// Log a completed sweep.
pub fn sweep_completed(sweep: &str, processed: usize, failed: usize) {
    tracing::info!(
        event = "sweep_completed",
        sweep = %sweep,
        processed = processed,
        failed = failed,
        "sweep completed"
    );
}

/// Log a single item failing inside a sweep.
pub fn sweep_item_failed(sweep: &str, campaign_id: &str, error: &str) {
    tracing::error!(
        event = "sweep_item_failed",
        sweep = %sweep,
        campaign_id = %campaign_id,
        error = %error,
        "sweep item failed"
    );
}

/// Log the scheduler starting or stopping.
pub fn scheduler_lifecycle(state: &str, interval_secs: u64) {
    tracing::info!(
        event = "scheduler_lifecycle",
        state = %state,
        interval_secs = interval_secs,
        "scheduler {state}"
    );
}
