use serde::{Deserialize, Serialize};

use super::defaults;

/// Content generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Include retrieved examples in AI prompts.
    pub rag_enabled: bool,
    pub rag_max_examples: usize,
    pub rag_threshold: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rag_enabled: defaults::DEFAULT_RAG_ENABLED,
            rag_max_examples: defaults::DEFAULT_RAG_MAX_EXAMPLES,
            rag_threshold: defaults::DEFAULT_RAG_THRESHOLD,
        }
    }
}
