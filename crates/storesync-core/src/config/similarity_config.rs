use serde::{Deserialize, Serialize};

use super::defaults;

/// Similarity search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub default_threshold: f64,
    pub default_limit: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            default_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            default_limit: defaults::DEFAULT_SIMILARITY_LIMIT,
        }
    }
}
