//! AI usage and template fallbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storesync_core::models::GeneratedContent;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub total: u64,
    pub ai_generated: u64,
    /// Fallback count keyed by reason.
    pub fallbacks: BTreeMap<String, u64>,
    pub rag_examples_used: u64,
    pub embeddings_computed: u64,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, generated: &GeneratedContent, embedded: bool) {
        self.total += 1;
        if generated.used_ai {
            self.ai_generated += 1;
        }
        if let Some(reason) = generated.fallback_reason {
            *self.fallbacks.entry(reason.to_string()).or_default() += 1;
        }
        self.rag_examples_used += generated.rag_examples_used as u64;
        if embedded {
            self.embeddings_computed += 1;
        }
    }

    /// Fraction of generations produced by the AI provider.
    pub fn ai_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.ai_generated as f64 / self.total as f64
        }
    }
}
