//! Load-generate-persist units of work keyed by campaign id.

use std::sync::Arc;

use tracing::info;

use storesync_observability::generation_span;

use storesync_core::cancel::CancelToken;
use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{CampaignBundle, GeneratedEmail, GeneratedWithEmbedding};
use storesync_core::traits::ICampaignStorage;

use crate::generator::ContentGenerator;

/// Each call reloads the campaign fresh and persists its own result.
pub struct ContentPipeline {
    storage: Arc<dyn ICampaignStorage>,
    generator: Arc<ContentGenerator>,
}

impl ContentPipeline {
    pub fn new(storage: Arc<dyn ICampaignStorage>, generator: Arc<ContentGenerator>) -> Self {
        Self { storage, generator }
    }

    pub fn generator(&self) -> &Arc<ContentGenerator> {
        &self.generator
    }

    fn load(&self, campaign_id: &str) -> StoreSyncResult<CampaignBundle> {
        self.storage
            .load_bundle(campaign_id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", campaign_id))
    }

    /// Generate copy (and an embedding when possible) and save both together.
    pub fn generate_for_campaign(
        &self,
        campaign_id: &str,
        use_ai: bool,
        extra_instructions: Option<&str>,
    ) -> StoreSyncResult<GeneratedWithEmbedding> {
        self.generate_for_campaign_until(
            campaign_id,
            use_ai,
            extra_instructions,
            &CancelToken::new(),
        )
    }

    /// As [`generate_for_campaign`](Self::generate_for_campaign), but nothing
    /// is saved once `cancel` fires.
    pub fn generate_for_campaign_until(
        &self,
        campaign_id: &str,
        use_ai: bool,
        extra_instructions: Option<&str>,
        cancel: &CancelToken,
    ) -> StoreSyncResult<GeneratedWithEmbedding> {
        let _span = generation_span!(campaign_id, use_ai).entered();
        let bundle = self.load(campaign_id)?;
        let result = self
            .generator
            .generate_and_embed(&bundle, use_ai, extra_instructions)?;
        cancel.check("generated content")?;
        self.storage.save_generated_content(
            campaign_id,
            &result.generated.content,
            result.embedding.as_deref(),
        )?;
        info!(
            campaign_id,
            used_ai = result.generated.used_ai,
            embedded = result.embedding.is_some(),
            "campaign content saved"
        );
        Ok(result)
    }

    /// Generate HTML, subject and preview text and save them together.
    pub fn generate_email_for_campaign(&self, campaign_id: &str) -> StoreSyncResult<GeneratedEmail> {
        self.generate_email_for_campaign_until(campaign_id, &CancelToken::new())
    }

    pub fn generate_email_for_campaign_until(
        &self,
        campaign_id: &str,
        cancel: &CancelToken,
    ) -> StoreSyncResult<GeneratedEmail> {
        let bundle = self.load(campaign_id)?;
        let email = self.generator.generate_full_email(&bundle)?;
        cancel.check("email content")?;
        self.storage.save_email_content(campaign_id, &email)?;
        info!(campaign_id, subject = %email.subject, "campaign email saved");
        Ok(email)
    }
}
