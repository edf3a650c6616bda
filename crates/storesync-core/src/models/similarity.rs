use serde::{Deserialize, Serialize};

use super::CampaignStatus;

/// Filters applied to a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityQuery {
    pub limit: usize,
    /// Minimum cosine similarity in `[0, 1]`.
    pub threshold: f64,
    pub exclude_ids: Vec<String>,
    pub brand_id: Option<String>,
    /// Empty means any status.
    pub statuses: Vec<CampaignStatus>,
}

impl SimilarityQuery {
    pub fn new(limit: usize, threshold: f64) -> Self {
        Self {
            limit,
            threshold,
            exclude_ids: Vec::new(),
            brand_id: None,
            statuses: Vec::new(),
        }
    }

    /// Cosine distance cutoff equivalent to `threshold`.
    pub fn max_distance(&self) -> f64 {
        1.0 - self.threshold
    }
}

/// Raw nearest-neighbour hit from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub campaign_id: String,
    pub brand_name: String,
    pub location_name: String,
    pub template_name: String,
    pub campaign_type: String,
    pub status: CampaignStatus,
    pub generated_content: String,
    pub distance: f64,
}

/// A similar campaign as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCampaign {
    pub campaign_id: String,
    pub brand_name: String,
    pub location_name: String,
    pub template_name: String,
    pub campaign_type: String,
    pub status: CampaignStatus,
    pub content_preview: String,
    pub similarity: f64,
    pub distance: f64,
}

/// A past campaign supplied to the generator as a few-shot example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagExample {
    pub campaign_id: String,
    pub brand_name: String,
    pub location_name: String,
    pub content: String,
    pub similarity: f64,
}

/// Outcome counts of a bulk embedding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSummary {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}
