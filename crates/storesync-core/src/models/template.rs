use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A brand-owned reusable campaign template.
///
/// Campaigns reference templates by id; edits here only affect future
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTemplate {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    /// Free-form tag such as `promotion` or `seasonal`.
    pub campaign_type: String,
    pub content: String,
    /// Variable names the template author expects in every render context.
    pub required_variables: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
