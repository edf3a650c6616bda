/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    ParseError { reason: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
