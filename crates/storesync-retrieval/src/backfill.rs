//! Embedding computation for campaigns that already have content.

use tracing::{error, info, warn};

use storesync_core::cancel::CancelToken;
use storesync_core::constants::MAX_BULK_BATCH_SIZE;
use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::EmbeddingSummary;

use crate::index::SimilarityIndex;

impl SimilarityIndex {
    /// Embed and store a campaign's content. Returns `false` when there is no
    /// content to embed. Provider and storage errors propagate.
    pub fn compute_embedding_for_campaign(&self, campaign_id: &str) -> StoreSyncResult<bool> {
        self.compute_embedding_until(campaign_id, &CancelToken::new())
    }

    /// Embed one campaign, skipping the save once `cancel` fires.
    pub fn compute_embedding_until(
        &self,
        campaign_id: &str,
        cancel: &CancelToken,
    ) -> StoreSyncResult<bool> {
        let campaign = self
            .storage
            .get_campaign(campaign_id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", campaign_id))?;
        if !campaign.has_content() {
            warn!(campaign_id, "campaign has no content to embed");
            return Ok(false);
        }
        let embedding = self.embedder.embed(&campaign.generated_content)?;
        cancel.check("embedding")?;
        self.storage.save_embedding(campaign_id, &embedding)?;
        info!(campaign_id, dimensions = embedding.len(), "embedding computed");
        Ok(true)
    }

    /// Embed every campaign with content that lacks an embedding (all of
    /// them with `recompute`), optionally restricted to `ids`. Per-campaign
    /// failures are counted, not raised.
    pub fn bulk_compute_embeddings(
        &self,
        ids: Option<&[String]>,
        recompute: bool,
    ) -> StoreSyncResult<EmbeddingSummary> {
        if let Some(ids) = ids {
            if ids.len() > MAX_BULK_BATCH_SIZE {
                return Err(StoreSyncError::validation(
                    "campaign_ids",
                    format!("at most {MAX_BULK_BATCH_SIZE} ids per call, got {}", ids.len()),
                ));
            }
        }
        if !self.embedder.is_configured() {
            return Err(StoreSyncError::not_configured("text embedding"));
        }

        let targets = self.storage.campaigns_needing_embedding(ids, recompute)?;
        let mut summary = EmbeddingSummary::default();
        for campaign_id in &targets {
            match self.compute_embedding_for_campaign(campaign_id) {
                Ok(true) => summary.success += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(campaign_id = %campaign_id, error = %e, "failed to embed campaign");
                    summary.failed += 1;
                }
            }
        }
        summary.total = summary.success + summary.failed;
        info!(
            success = summary.success,
            failed = summary.failed,
            "bulk embedding finished"
        );
        Ok(summary)
    }
}
