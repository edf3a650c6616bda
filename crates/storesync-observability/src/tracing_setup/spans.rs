//! Span definitions per operation: transition, generation, similarity, task, sweep, email batch.

/// Create a workflow transition span.
#[macro_export]
macro_rules! transition_span {
    ($campaign_id:expr, $action:expr) => {
        tracing::info_span!("storesync.transition", campaign_id = %$campaign_id, action = %$action)
    };
}

/// Create a content generation span.
#[macro_export]
macro_rules! generation_span {
    ($campaign_id:expr, $use_ai:expr) => {
        tracing::info_span!("storesync.generation", campaign_id = %$campaign_id, use_ai = $use_ai)
    };
}

/// Create a similarity search span.
#[macro_export]
macro_rules! similarity_span {
    ($limit:expr, $threshold:expr) => {
        tracing::info_span!("storesync.similarity", limit = $limit, threshold = $threshold)
    };
}

/// Create a background task span.
#[macro_export]
macro_rules! task_span {
    ($task_id:expr, $kind:expr) => {
        tracing::info_span!("storesync.task", task_id = %$task_id, kind = %$kind)
    };
}

/// Create a periodic sweep span.
#[macro_export]
macro_rules! sweep_span {
    ($sweep:expr) => {
        tracing::info_span!("storesync.sweep", sweep = %$sweep)
    };
}

/// Create an email batch span.
#[macro_export]
macro_rules! email_batch_span {
    ($campaign_id:expr) => {
        tracing::info_span!("storesync.email_batch", campaign_id = %$campaign_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TRANSITION: &str = "storesync.transition";
    pub const GENERATION: &str = "storesync.generation";
    pub const SIMILARITY: &str = "storesync.similarity";
    pub const TASK: &str = "storesync.task";
    pub const SWEEP: &str = "storesync.sweep";
    pub const EMAIL_BATCH: &str = "storesync.email_batch";
}
