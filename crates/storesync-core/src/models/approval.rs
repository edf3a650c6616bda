use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CampaignStatus, TransitionAction};
use crate::errors::StoreSyncError;

/// Decision tag recorded on an approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Submitted,
    Approved,
    Rejected,
    RequestedChanges,
    Scheduled,
    Activated,
    Completed,
}

impl Decision {
    pub const ALL: [Decision; 7] = [
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
        Self::RequestedChanges,
        Self::Scheduled,
        Self::Activated,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RequestedChanges => "requested_changes",
            Self::Scheduled => "scheduled",
            Self::Activated => "activated",
            Self::Completed => "completed",
        }
    }
}

impl From<TransitionAction> for Decision {
    fn from(action: TransitionAction) -> Self {
        match action {
            TransitionAction::Submit => Self::Submitted,
            TransitionAction::Approve => Self::Approved,
            TransitionAction::Reject => Self::Rejected,
            TransitionAction::Schedule => Self::Scheduled,
            TransitionAction::Activate => Self::Activated,
            TransitionAction::Complete => Self::Completed,
            TransitionAction::Revise => Self::RequestedChanges,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = StoreSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| StoreSyncError::validation("decision", format!("unknown decision '{s}'")))
    }
}

/// Append-only audit record of one successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalStep {
    pub id: i64,
    pub campaign_id: String,
    pub actor: String,
    pub decision: Decision,
    pub comments: String,
    pub previous_status: CampaignStatus,
    pub new_status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

/// An approval step before persistence assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApprovalStep {
    pub campaign_id: String,
    pub actor: String,
    pub decision: Decision,
    pub comments: String,
    pub previous_status: CampaignStatus,
    pub new_status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}
