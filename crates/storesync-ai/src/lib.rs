//! # storesync-ai
//!
//! Pluggable text-completion and embedding capabilities.
//!
//! Providers:
//! - `ApiCompleter` / `ApiEmbedder`: OpenAI-compatible HTTP APIs
//! - `UnconfiguredCompleter` / `UnconfiguredEmbedder`: sentinels used when no
//!   API key is present, so callers can detect and fall back
//! - `CachedEmbedder`: content-hash keyed moka cache in front of any embedder

pub mod cache;
pub mod completion;
pub mod embedding;
mod http;
pub mod unconfigured;

pub use cache::CachedEmbedder;
pub use completion::ApiCompleter;
pub use embedding::ApiEmbedder;
pub use unconfigured::{UnconfiguredCompleter, UnconfiguredEmbedder};

use std::sync::Arc;

use storesync_core::config::AiConfig;
use storesync_core::traits::{ITextCompleter, ITextEmbedder};
use tracing::{info, warn};

/// Build the completion capability. Without an API key this is the
/// unconfigured sentinel.
pub fn create_completer(config: &AiConfig) -> Arc<dyn ITextCompleter> {
    create_completer_with_budget(config, config.max_tokens)
}

/// Completion capability with the larger HTML-email token budget.
pub fn create_email_completer(config: &AiConfig) -> Arc<dyn ITextCompleter> {
    create_completer_with_budget(config, config.html_max_tokens)
}

fn create_completer_with_budget(config: &AiConfig, max_tokens: u32) -> Arc<dyn ITextCompleter> {
    if !config.is_configured() {
        warn!(
            api_key_env = %config.api_key_env,
            "no API key configured; AI completion disabled"
        );
        return Arc::new(UnconfiguredCompleter);
    }
    info!(
        provider = "api",
        model = %config.completion_model,
        max_tokens,
        "completion provider configured"
    );
    Arc::new(ApiCompleter::new(config).with_max_tokens(max_tokens))
}

/// Build the embedding capability, cached by content hash.
pub fn create_embedder(config: &AiConfig) -> Arc<dyn ITextEmbedder> {
    if !config.is_configured() {
        warn!(
            api_key_env = %config.api_key_env,
            "no API key configured; embeddings disabled"
        );
        return Arc::new(UnconfiguredEmbedder::new(config.embedding_dimensions));
    }
    info!(
        provider = "api",
        model = %config.embedding_model,
        dimensions = config.embedding_dimensions,
        "embedding provider configured"
    );
    Arc::new(CachedEmbedder::new(
        Box::new(ApiEmbedder::new(config)),
        config.embedding_cache_capacity,
    ))
}
