/// Content-generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("completion failed via {provider}: {reason}")]
    CompletionFailed { provider: String, reason: String },

    #[error("completion returned empty output via {provider}")]
    EmptyCompletion { provider: String },

    #[error("campaign {campaign_id} has no generated content")]
    MissingContent { campaign_id: String },
}
