use crate::models::{CampaignBundle, RagExample};

/// Supplies past campaigns as few-shot examples for generation.
///
/// Infallible by contract: implementations return an empty list on error.
pub trait IExampleRetriever: Send + Sync {
    fn rag_context(
        &self,
        bundle: &CampaignBundle,
        max_examples: usize,
        threshold: f64,
    ) -> Vec<RagExample>;
}
