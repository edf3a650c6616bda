//! "Not configured" sentinels. Every call fails with `NotConfigured`, which
//! callers treat as a recoverable signal to fall back.

use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::traits::{ITextCompleter, ITextEmbedder};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCompleter;

impl ITextCompleter for UnconfiguredCompleter {
    fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> StoreSyncResult<String> {
        Err(StoreSyncError::not_configured("text completion"))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredEmbedder {
    dimensions: usize,
}

impl UnconfiguredEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl ITextEmbedder for UnconfiguredEmbedder {
    fn embed(&self, _text: &str) -> StoreSyncResult<Vec<f32>> {
        Err(StoreSyncError::not_configured("text embedding"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "unconfigured"
    }

    fn is_configured(&self) -> bool {
        false
    }
}
