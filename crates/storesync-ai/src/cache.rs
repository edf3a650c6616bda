//! In-memory embedding cache keyed by blake3 content hash.

use moka::sync::Cache;
use tracing::debug;

use storesync_core::errors::StoreSyncResult;
use storesync_core::traits::ITextEmbedder;

/// Wraps an embedder so identical texts are embedded once.
/// Failures are not cached.
pub struct CachedEmbedder {
    inner: Box<dyn ITextEmbedder>,
    cache: Cache<String, Vec<f32>>,
}

impl CachedEmbedder {
    pub fn new(inner: Box<dyn ITextEmbedder>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    pub fn content_hash(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl ITextEmbedder for CachedEmbedder {
    fn embed(&self, text: &str) -> StoreSyncResult<Vec<f32>> {
        let key = Self::content_hash(text);
        if let Some(hit) = self.cache.get(&key) {
            debug!(hash = %key, "embedding cache hit");
            return Ok(hit);
        }
        let embedding = self.inner.embed(text)?;
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }
}
