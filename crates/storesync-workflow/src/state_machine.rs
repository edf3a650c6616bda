//! The campaign transition table.
//!
//! | from                | action   | to             | precondition            |
//! |---------------------|----------|----------------|-------------------------|
//! | draft               | submit   | pending_review |                         |
//! | pending_review      | approve  | approved       |                         |
//! | pending_review      | reject   | rejected       | non-blank comments      |
//! | approved            | schedule | scheduled      | start and end, start<end|
//! | scheduled           | activate | active         |                         |
//! | active              | complete | completed      |                         |
//! | draft, rejected     | revise   | draft          |                         |
//!
//! Pure: no persistence and no authorization.

use chrono::{DateTime, Utc};

use storesync_core::errors::TransitionError;
use storesync_core::models::{CampaignStatus, TransitionAction};

/// Data the preconditions look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionInput<'a> {
    pub comments: &'a str,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
}

/// Target status for `(from, action)`, ignoring preconditions.
pub fn target(from: CampaignStatus, action: TransitionAction) -> Option<CampaignStatus> {
    use CampaignStatus as S;
    use TransitionAction as A;

    match (from, action) {
        (S::Draft, A::Submit) => Some(S::PendingReview),
        (S::PendingReview, A::Approve) => Some(S::Approved),
        (S::PendingReview, A::Reject) => Some(S::Rejected),
        (S::Approved, A::Schedule) => Some(S::Scheduled),
        (S::Scheduled, A::Activate) => Some(S::Active),
        (S::Active, A::Complete) => Some(S::Completed),
        (S::Draft | S::Rejected, A::Revise) => Some(S::Draft),
        _ => None,
    }
}

/// Actions legal from `from`.
pub fn allowed_actions(from: CampaignStatus) -> Vec<TransitionAction> {
    TransitionAction::ALL
        .into_iter()
        .filter(|action| target(from, *action).is_some())
        .collect()
}

/// Validate `(from, action)` and its preconditions, returning the new status.
pub fn transition(
    from: CampaignStatus,
    action: TransitionAction,
    input: &TransitionInput<'_>,
) -> Result<CampaignStatus, TransitionError> {
    let to = target(from, action).ok_or_else(|| TransitionError::InvalidTransition {
        from: from.to_string(),
        action: action.to_string(),
    })?;

    match action {
        TransitionAction::Reject if input.comments.trim().is_empty() => {
            Err(TransitionError::EmptyRejectionComments)
        }
        TransitionAction::Schedule => {
            check_schedule_window(input.scheduled_start, input.scheduled_end)?;
            Ok(to)
        }
        _ => Ok(to),
    }
}

/// Both bounds set and start strictly before end.
pub fn check_schedule_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), TransitionError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(TransitionError::MissingSchedule);
    };
    if start >= end {
        return Err(TransitionError::InvalidScheduleWindow {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    Ok(())
}
