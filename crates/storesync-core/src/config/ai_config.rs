use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::DEFAULT_EMBEDDING_DIMENSIONS;

/// Completion and embedding provider configuration.
///
/// Both capabilities are unconfigured while `api_key` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Resolved at load time from the variable named by `api_key_env`.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_key_env: String,
    pub completion_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Token budget for HTML email generation.
    pub html_max_tokens: u32,
    pub timeout_secs: u64,
    /// In-provider HTTP retries for transient failures.
    pub max_retries: u32,
    pub embedding_cache_capacity: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_AI_BASE_URL.to_string(),
            api_key: String::new(),
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
            completion_model: defaults::DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            temperature: defaults::DEFAULT_TEMPERATURE,
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            html_max_tokens: defaults::DEFAULT_HTML_MAX_TOKENS,
            timeout_secs: defaults::DEFAULT_AI_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_AI_MAX_RETRIES,
            embedding_cache_capacity: defaults::DEFAULT_EMBEDDING_CACHE_CAPACITY,
        }
    }
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
