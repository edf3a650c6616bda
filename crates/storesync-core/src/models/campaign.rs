use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Brand, CampaignTemplate, ContextMap, Location};
use crate::errors::StoreSyncError;

/// Lifecycle status of a location campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Scheduled,
    Active,
    Completed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 7] = [
        Self::Draft,
        Self::PendingReview,
        Self::Approved,
        Self::Rejected,
        Self::Scheduled,
        Self::Active,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = StoreSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StoreSyncError::validation("status", format!("unknown status '{s}'")))
    }
}

/// A state-machine edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Submit,
    Approve,
    Reject,
    Schedule,
    Activate,
    Complete,
    Revise,
}

impl TransitionAction {
    pub const ALL: [TransitionAction; 7] = [
        Self::Submit,
        Self::Approve,
        Self::Reject,
        Self::Schedule,
        Self::Activate,
        Self::Complete,
        Self::Revise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Schedule => "schedule",
            Self::Activate => "activate",
            Self::Complete => "complete",
            Self::Revise => "revise",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionAction {
    type Err = StoreSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| StoreSyncError::validation("action", format!("unknown action '{s}'")))
    }
}

/// Per-location instantiation of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCampaign {
    pub id: String,
    pub location_id: String,
    pub template_id: String,
    pub created_by: Option<String>,
    pub status: CampaignStatus,
    /// Overrides template defaults during rendering.
    pub customizations: ContextMap,
    pub generated_content: String,
    pub generated_html_email: String,
    pub email_subject: String,
    pub email_preview_text: String,
    /// `None` means not yet computed.
    pub embedding: Option<Vec<f32>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationCampaign {
    /// A fresh draft campaign.
    pub fn new(location_id: &str, template_id: &str, created_by: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            location_id: location_id.to_string(),
            template_id: template_id.to_string(),
            created_by: created_by.map(str::to_string),
            status: CampaignStatus::Draft,
            customizations: ContextMap::new(),
            generated_content: String::new(),
            generated_html_email: String::new(),
            email_subject: String::new(),
            email_preview_text: String::new(),
            embedding: None,
            scheduled_start: None,
            scheduled_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.generated_content.trim().is_empty()
    }

    pub fn has_html_email(&self) -> bool {
        !self.generated_html_email.trim().is_empty()
    }
}

/// A campaign joined with the master data generation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBundle {
    pub campaign: LocationCampaign,
    pub location: Location,
    pub brand: Brand,
    pub template: CampaignTemplate,
}

/// Field edits accepted by the campaign service. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    pub template_id: Option<String>,
    pub customizations: Option<ContextMap>,
    pub generated_content: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
}

impl CampaignUpdate {
    pub fn touches_draft_only_fields(&self) -> bool {
        self.template_id.is_some()
            || self.customizations.is_some()
            || self.generated_content.is_some()
    }

    pub fn touches_schedule(&self) -> bool {
        self.scheduled_start.is_some() || self.scheduled_end.is_some()
    }
}
