//! SimilarityIndex: nearest-campaign search over stored embeddings.

use std::sync::Arc;

use tracing::{debug, warn};

use storesync_observability::similarity_span;

use storesync_core::config::SimilarityConfig;
use storesync_core::constants::CONTENT_PREVIEW_CHARS;
use storesync_core::errors::{RetrievalError, StoreSyncError, StoreSyncResult};
use storesync_core::models::{SimilarCampaign, SimilarityQuery, VectorMatch};
use storesync_core::traits::{ICampaignStorage, ITextEmbedder};

pub struct SimilarityIndex {
    pub(crate) storage: Arc<dyn ICampaignStorage>,
    pub(crate) embedder: Arc<dyn ITextEmbedder>,
    config: SimilarityConfig,
}

impl SimilarityIndex {
    pub fn new(
        storage: Arc<dyn ICampaignStorage>,
        embedder: Arc<dyn ITextEmbedder>,
        config: SimilarityConfig,
    ) -> Self {
        Self {
            storage,
            embedder,
            config,
        }
    }

    /// A query with the configured default limit and threshold.
    pub fn default_query(&self) -> SimilarityQuery {
        SimilarityQuery::new(self.config.default_limit, self.config.default_threshold)
    }

    /// Campaigns whose similarity to `query_embedding` is at least
    /// `query.threshold`, nearest first. Only embedded campaigns participate.
    pub fn find_similar(
        &self,
        query_embedding: &[f32],
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<SimilarCampaign>> {
        let _span = similarity_span!(query.limit, query.threshold).entered();
        if !(0.0..=1.0).contains(&query.threshold) {
            return Err(StoreSyncError::validation(
                "threshold",
                format!("{} is outside [0, 1]", query.threshold),
            ));
        }
        if query_embedding.is_empty() {
            return Err(RetrievalError::EmptyQuery.into());
        }
        let matches = self.storage.find_nearest(query_embedding, query)?;
        debug!(
            results = matches.len(),
            limit = query.limit,
            threshold = query.threshold,
            "similarity search"
        );
        Ok(matches.into_iter().map(to_similar).collect())
    }

    /// Embed `text` and search with it.
    pub fn find_similar_by_text(
        &self,
        text: &str,
        query: &SimilarityQuery,
    ) -> StoreSyncResult<Vec<SimilarCampaign>> {
        if text.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery.into());
        }
        let embedding = self.embedder.embed(text)?;
        self.find_similar(&embedding, query)
    }

    /// Campaigns similar to `campaign_id`, never including itself. A campaign
    /// without an embedding yet has no neighbours.
    pub fn find_similar_to_campaign(
        &self,
        campaign_id: &str,
        limit: usize,
        threshold: f64,
        same_brand_only: bool,
    ) -> StoreSyncResult<Vec<SimilarCampaign>> {
        let bundle = self
            .storage
            .load_bundle(campaign_id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", campaign_id))?;
        let Some(embedding) = bundle.campaign.embedding.as_deref() else {
            warn!(campaign_id, "campaign has no embedding yet");
            return Ok(Vec::new());
        };

        let mut query = SimilarityQuery::new(limit, threshold);
        query.exclude_ids.push(campaign_id.to_string());
        if same_brand_only {
            query.brand_id = Some(bundle.brand.id.clone());
        }
        self.find_similar(embedding, &query)
    }
}

/// `text` cut to `max` chars with `...` appended when truncated.
pub fn content_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{kept}...")
}

fn to_similar(m: VectorMatch) -> SimilarCampaign {
    SimilarCampaign {
        content_preview: content_preview(&m.generated_content, CONTENT_PREVIEW_CHARS),
        similarity: 1.0 - m.distance,
        campaign_id: m.campaign_id,
        brand_name: m.brand_name,
        location_name: m.location_name,
        template_name: m.template_name,
        campaign_type: m.campaign_type,
        status: m.status,
        distance: m.distance,
    }
}
