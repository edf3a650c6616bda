/// Background task errors.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task {task_id} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        task_id: String,
        attempts: u32,
        last_error: String,
    },

    #[error("task {task_id} exceeded its {budget_secs}s budget")]
    TimedOut { task_id: String, budget_secs: u64 },

    #[error("task queue closed")]
    QueueClosed,

    #[error("attempt cancelled before saving {what}")]
    Cancelled { what: String },

    #[error("task {task_id} panicked: {reason}")]
    Panicked { task_id: String, reason: String },
}
