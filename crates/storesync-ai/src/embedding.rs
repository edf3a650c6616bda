//! OpenAI-compatible embedding provider.

use serde::{Deserialize, Serialize};

use storesync_core::config::AiConfig;
use storesync_core::errors::{EmbeddingError, StoreSyncResult};
use storesync_core::traits::ITextEmbedder;

use crate::http::ApiClient;

pub struct ApiEmbedder {
    client: ApiClient,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl ApiEmbedder {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: ApiClient::new(config),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
        }
    }
}

impl ITextEmbedder for ApiEmbedder {
    fn embed(&self, text: &str) -> StoreSyncResult<Vec<f32>> {
        let response: EmbedResponse = self
            .client
            .post_json(
                "embeddings",
                &EmbedRequest {
                    model: &self.model,
                    input: text,
                },
            )
            .map_err(|reason| EmbeddingError::InferenceFailed { reason })?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InferenceFailed {
                reason: "empty response".to_string(),
            })?;
        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            }
            .into());
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        true
    }
}
