/// Rejections produced by the campaign state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid transition: cannot {action} a campaign in status {from}")]
    InvalidTransition { from: String, action: String },

    #[error("schedule requires both scheduled_start and scheduled_end")]
    MissingSchedule,

    #[error("scheduled_start {start} must be before scheduled_end {end}")]
    InvalidScheduleWindow { start: String, end: String },

    #[error("rejection requires non-empty comments")]
    EmptyRejectionComments,
}
