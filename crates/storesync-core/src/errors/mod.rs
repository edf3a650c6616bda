mod config_error;
mod embedding_error;
mod generation_error;
mod retrieval_error;
mod storage_error;
mod task_error;
mod template_error;
mod transition_error;
mod transport_error;

pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use generation_error::GenerationError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use task_error::TaskError;
pub use template_error::TemplateError;
pub use transition_error::TransitionError;
pub use transport_error::TransportError;

/// Top-level error for every StoreSync operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreSyncError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("permission denied for {actor}: {reason}")]
    PermissionDenied { actor: String, reason: String },

    #[error("validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("{capability} is not configured")]
    NotConfigured { capability: String },

    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("transition error: {0}")]
    TransitionError(#[from] TransitionError),

    #[error("template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("generation error: {0}")]
    GenerationError(#[from] GenerationError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("task error: {0}")]
    TaskError(#[from] TaskError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl StoreSyncError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn not_configured(capability: &str) -> Self {
        Self::NotConfigured {
            capability: capability.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag for the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::NotConfigured { .. } => "not_configured",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::StorageError(_) => "storage",
            Self::TransitionError(_) => "invalid_transition",
            Self::TemplateError(_) => "template",
            Self::GenerationError(_) => "generation",
            Self::EmbeddingError(_) => "embedding",
            Self::TransportError(_) => "transport",
            Self::RetrievalError(_) => "retrieval",
            Self::TaskError(_) => "task",
            Self::ConfigError(_) => "config",
            Self::SerializationError(_) => "serialization",
        }
    }
}

pub type StoreSyncResult<T> = Result<T, StoreSyncError>;
