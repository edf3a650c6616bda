//! OpenAI-compatible chat-completion provider.

use serde::{Deserialize, Serialize};
use tracing::debug;

use storesync_core::config::AiConfig;
use storesync_core::errors::{GenerationError, StoreSyncResult};
use storesync_core::traits::ITextCompleter;

use crate::http::ApiClient;

pub struct ApiCompleter {
    client: ApiClient,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

impl ApiCompleter {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: ApiClient::new(config),
            model: config.completion_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn failed(&self, reason: String) -> GenerationError {
        GenerationError::CompletionFailed {
            provider: self.model.clone(),
            reason,
        }
    }
}

impl ITextCompleter for ApiCompleter {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> StoreSyncResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response: ChatResponse = self
            .client
            .post_json("chat/completions", &request)
            .map_err(|reason| self.failed(reason))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion {
                provider: self.model.clone(),
            }
            .into());
        }
        debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        true
    }
}
