//! Retrieval-augmented examples for the content generator.
//!
//! Same-brand campaigns that actually ran are preferred; cross-brand results
//! top up the list. Any failure yields an empty list.

use tracing::{debug, warn};

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{
    CampaignBundle, CampaignStatus, RagExample, SimilarCampaign, SimilarityQuery,
};
use storesync_core::traits::IExampleRetriever;

use crate::index::SimilarityIndex;

/// Statuses of campaigns that have been live.
const EXAMPLE_STATUSES: [CampaignStatus; 2] = [CampaignStatus::Completed, CampaignStatus::Active];

/// Synthetic query describing the campaign being generated.
pub fn rag_query_text(bundle: &CampaignBundle) -> String {
    let mut lines = vec![
        format!("Brand: {}", bundle.brand.name),
        format!("Location: {}", bundle.location.name),
        format!("Template: {}", bundle.template.name),
        format!("Campaign type: {}", bundle.template.campaign_type),
    ];
    lines.extend(
        bundle
            .campaign
            .customizations
            .iter()
            .map(|(k, v)| format!("{k}: {v}")),
    );
    lines.join("\n")
}

impl SimilarityIndex {
    fn try_rag_context(
        &self,
        bundle: &CampaignBundle,
        max_examples: usize,
        threshold: f64,
    ) -> StoreSyncResult<Vec<SimilarCampaign>> {
        if max_examples == 0 {
            return Ok(Vec::new());
        }
        let text = rag_query_text(bundle);
        let embedding = self.embedder.embed(&text)?;

        let mut query = SimilarityQuery::new(max_examples, threshold);
        query.exclude_ids.push(bundle.campaign.id.clone());
        query.brand_id = Some(bundle.brand.id.clone());
        query.statuses = EXAMPLE_STATUSES.to_vec();
        let mut found = self.find_similar(&embedding, &query)?;

        if found.len() < max_examples {
            query.limit = max_examples - found.len();
            query.brand_id = None;
            query
                .exclude_ids
                .extend(found.iter().map(|s| s.campaign_id.clone()));
            found.extend(self.find_similar(&embedding, &query)?);
        }
        Ok(found)
    }
}

impl IExampleRetriever for SimilarityIndex {
    fn rag_context(
        &self,
        bundle: &CampaignBundle,
        max_examples: usize,
        threshold: f64,
    ) -> Vec<RagExample> {
        match self.try_rag_context(bundle, max_examples, threshold) {
            Ok(found) => {
                debug!(
                    campaign_id = %bundle.campaign.id,
                    examples = found.len(),
                    "retrieved RAG examples"
                );
                found
                    .into_iter()
                    .map(|s| RagExample {
                        campaign_id: s.campaign_id,
                        brand_name: s.brand_name,
                        location_name: s.location_name,
                        content: s.content_preview,
                        similarity: s.similarity,
                    })
                    .collect()
            }
            Err(e) => {
                warn!(campaign_id = %bundle.campaign.id, error = %e, "RAG lookup failed");
                Vec::new()
            }
        }
    }
}
