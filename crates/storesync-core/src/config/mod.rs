//! Configuration with layered resolution.

mod ai_config;
pub mod defaults;
mod email_config;
mod generation_config;
mod observability_config;
mod scheduler_config;
mod similarity_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use ai_config::AiConfig;
pub use email_config::{EmailConfig, MailTransportKind, SmtpConfig, SmtpSecurity};
pub use generation_config::GenerationConfig;
pub use observability_config::ObservabilityConfig;
pub use scheduler_config::SchedulerConfig;
pub use similarity_config::SimilarityConfig;
pub use storage_config::StorageConfig;

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`STORESYNC_*`, plus the API key variable)
/// 2. TOML file
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSyncConfig {
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub generation: GenerationConfig,
    pub similarity: SimilarityConfig,
    pub scheduler: SchedulerConfig,
    pub email: EmailConfig,
    pub observability: ObservabilityConfig,
}

impl StoreSyncConfig {
    /// Load from an optional TOML file, apply process environment overrides,
    /// then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string. Missing sections and keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Apply `STORESYNC_*` overrides read through `lookup`.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STORESYNC_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = lookup(&self.ai.api_key_env) {
            self.ai.api_key = v;
        }
        if let Some(v) = lookup("STORESYNC_AI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Some(v) = lookup("STORESYNC_COMPLETION_MODEL") {
            self.ai.completion_model = v;
        }
        if let Some(v) = lookup("STORESYNC_EMBEDDING_MODEL") {
            self.ai.embedding_model = v;
        }
        if let Some(v) = lookup("STORESYNC_WORKER_COUNT").and_then(|v| v.parse().ok()) {
            self.scheduler.worker_count = v;
        }
        if let Some(v) = lookup("STORESYNC_SWEEP_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.scheduler.sweep_interval_secs = v;
        }
        if let Some(v) = lookup("STORESYNC_RAG_ENABLED").and_then(|v| v.parse().ok()) {
            self.generation.rag_enabled = v;
        }
        if let Some(v) = lookup("STORESYNC_FROM_ADDRESS") {
            self.email.from_address = v;
        }
        if let Some(v) = lookup("STORESYNC_MAIL_TRANSPORT") {
            match v.to_ascii_lowercase().as_str() {
                "logging" => self.email.transport = MailTransportKind::Logging,
                "smtp" => self.email.transport = MailTransportKind::Smtp,
                _ => {}
            }
        }
        if let Some(v) = lookup("STORESYNC_SMTP_HOST") {
            self.email.smtp.host = v;
        }
        if let Some(v) = lookup("STORESYNC_SMTP_PORT").and_then(|v| v.parse().ok()) {
            self.email.smtp.port = v;
        }
        if let Some(v) = lookup("STORESYNC_SMTP_USERNAME") {
            self.email.smtp.username = v;
        }
        if let Some(v) = lookup(&self.email.smtp.password_env) {
            self.email.smtp.password = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("generation.rag_threshold", self.generation.rag_threshold)?;
        check_unit_interval(
            "similarity.default_threshold",
            self.similarity.default_threshold,
        )?;
        check_positive("ai.embedding_dimensions", self.ai.embedding_dimensions as u64)?;
        check_positive("scheduler.worker_count", self.scheduler.worker_count as u64)?;
        check_positive("scheduler.queue_capacity", self.scheduler.queue_capacity as u64)?;
        check_positive("scheduler.task_timeout_secs", self.scheduler.task_timeout_secs)?;
        check_positive("scheduler.sweep_interval_secs", self.scheduler.sweep_interval_secs)?;
        check_positive(
            "scheduler.retention_interval_secs",
            self.scheduler.retention_interval_secs,
        )?;
        check_positive(
            "scheduler.approval_retention_days",
            self.scheduler.approval_retention_days.max(0) as u64,
        )?;
        check_positive("similarity.default_limit", self.similarity.default_limit as u64)?;
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::ValidationFailed {
                field: "ai.temperature".to_string(),
                message: "must be between 0.0 and 2.0".to_string(),
            });
        }
        if self.storage.db_path.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "storage.db_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !self.email.from_address.contains('@') {
            return Err(ConfigError::ValidationFailed {
                field: "email.from_address".to_string(),
                message: "must contain an address".to_string(),
            });
        }
        if self.email.transport == MailTransportKind::Smtp {
            if self.email.smtp.host.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "email.smtp.host".to_string(),
                    message: "required when email.transport is smtp".to_string(),
                });
            }
            check_positive("email.smtp.port", u64::from(self.email.smtp.port))?;
            check_positive("email.smtp.timeout_secs", self.email.smtp.timeout_secs)?;
        }
        Ok(())
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: "must be between 0.0 and 1.0".to_string(),
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}
