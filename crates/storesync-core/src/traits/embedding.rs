use crate::errors::StoreSyncResult;

/// Embedding capability ("embed text to a vector").
pub trait ITextEmbedder: Send + Sync {
    /// Embed a single text, returning a vector of floats.
    fn embed(&self, text: &str) -> StoreSyncResult<Vec<f32>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// False for the "not configured" sentinel.
    fn is_configured(&self) -> bool;
}
