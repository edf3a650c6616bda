use chrono::{DateTime, Utc};

use crate::errors::StoreSyncResult;
use crate::models::{
    ApprovalStep, Brand, CampaignBundle, CampaignStatus, CampaignTemplate, EmailRecipient,
    GeneratedEmail, Location, LocationCampaign, NewApprovalStep, NewRecipient, RecipientStats,
    RecipientStatus, SimilarityQuery, VectorMatch,
};

/// Read-only access to brand/location/template master data.
pub trait IMasterDataReader: Send + Sync {
    fn get_brand(&self, id: &str) -> StoreSyncResult<Option<Brand>>;
    fn get_location(&self, id: &str) -> StoreSyncResult<Option<Location>>;
    fn get_template(&self, id: &str) -> StoreSyncResult<Option<CampaignTemplate>>;
}

/// Campaign persistence: CRUD, transitions, generated artifacts, vectors, sweeps.
pub trait ICampaignStorage: Send + Sync {
    // --- CRUD ---
    fn insert_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()>;
    fn get_campaign(&self, id: &str) -> StoreSyncResult<Option<LocationCampaign>>;
    /// Persist field edits. Status is never written through this path.
    fn update_campaign(&self, campaign: &LocationCampaign) -> StoreSyncResult<()>;
    /// Delete a campaign with its approval steps and recipients.
    fn delete_campaign(&self, id: &str) -> StoreSyncResult<bool>;
    fn load_bundle(&self, id: &str) -> StoreSyncResult<Option<CampaignBundle>>;

    // --- Query ---
    fn list_by_status(&self, status: CampaignStatus) -> StoreSyncResult<Vec<LocationCampaign>>;
    fn list_by_location(&self, location_id: &str) -> StoreSyncResult<Vec<LocationCampaign>>;

    // --- Transitions ---
    /// Move `campaign_id` from `expected` to `step.new_status` and append the
    /// audit row in one unit of work. Fails without writing if the stored
    /// status is no longer `expected`.
    fn commit_transition(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep>;
    /// As [`commit_transition`](Self::commit_transition), also writing the
    /// schedule window in the same unit of work.
    fn commit_schedule(
        &self,
        campaign_id: &str,
        expected: CampaignStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &NewApprovalStep,
    ) -> StoreSyncResult<ApprovalStep>;
    /// Audit trail, newest first.
    fn approval_history(&self, campaign_id: &str) -> StoreSyncResult<Vec<ApprovalStep>>;

    // --- Generated artifacts ---
    fn save_generated_content(
        &self,
        campaign_id: &str,
        content: &str,
        embedding: Option<&[f32]>,
    ) -> StoreSyncResult<()>;
    fn save_embedding(&self, campaign_id: &str, embedding: &[f32]) -> StoreSyncResult<()>;
    fn save_email_content(&self, campaign_id: &str, email: &GeneratedEmail) -> StoreSyncResult<()>;

    // --- Vector ---
    fn find_nearest(
        &self,
        query_embedding: &[f32],
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<VectorMatch>>;
    /// Campaigns with content that still need an embedding (or all with
    /// content when `recompute`), optionally restricted to `ids`.
    fn campaigns_needing_embedding(
        &self,
        ids: Option<&[String]>,
        recompute: bool,
    ) -> StoreSyncResult<Vec<String>>;

    // --- Sweeps ---
    fn due_for_activation(&self, now: DateTime<Utc>) -> StoreSyncResult<Vec<String>>;
    fn due_for_completion(&self, now: DateTime<Utc>) -> StoreSyncResult<Vec<String>>;
    /// Delete approval steps older than `cutoff` belonging to completed campaigns.
    fn purge_approval_steps(&self, cutoff: DateTime<Utc>) -> StoreSyncResult<usize>;
}

/// Email recipient persistence.
pub trait IRecipientStorage: Send + Sync {
    /// Insert rows, ignoring addresses already present for the campaign.
    /// Returns the number inserted.
    fn insert_recipients(
        &self,
        campaign_id: &str,
        recipients: &[NewRecipient],
    ) -> StoreSyncResult<usize>;
    fn list_recipients(
        &self,
        campaign_id: &str,
        status: Option<RecipientStatus>,
    ) -> StoreSyncResult<Vec<EmailRecipient>>;
    fn get_recipients(&self, campaign_id: &str, ids: &[String])
        -> StoreSyncResult<Vec<EmailRecipient>>;
    fn mark_recipient_sent(&self, recipient_id: &str, at: DateTime<Utc>) -> StoreSyncResult<()>;
    fn mark_recipient_failed(&self, recipient_id: &str, error: &str) -> StoreSyncResult<()>;
    /// Remove only `pending` recipients. Returns the number removed.
    fn clear_pending_recipients(&self, campaign_id: &str) -> StoreSyncResult<usize>;
    fn recipient_stats(&self, campaign_id: &str) -> StoreSyncResult<RecipientStats>;
}
