use serde::{Deserialize, Serialize};

use super::defaults;

/// Which backend delivers outbound mail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    /// Log messages without delivering them.
    #[default]
    Logging,
    Smtp,
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    Tls,
    /// Plaintext. Local relays and test servers only.
    None,
}

/// Email delivery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub from_address: String,
    /// Prefix of the per-recipient unsubscribe link.
    pub unsubscribe_base: String,
    /// Pause after every N sends. Zero disables the pause.
    pub rate_limit_every: usize,
    pub rate_limit_pause_ms: u64,
    /// Cap on failures listed in a batch report.
    pub max_reported_errors: usize,
    pub transport: MailTransportKind,
    pub smtp: SmtpConfig,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: defaults::DEFAULT_FROM_ADDRESS.to_string(),
            unsubscribe_base: defaults::DEFAULT_UNSUBSCRIBE_BASE.to_string(),
            rate_limit_every: defaults::DEFAULT_RATE_LIMIT_EVERY,
            rate_limit_pause_ms: defaults::DEFAULT_RATE_LIMIT_PAUSE_MS,
            max_reported_errors: defaults::DEFAULT_MAX_REPORTED_ERRORS,
            transport: MailTransportKind::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// SMTP relay settings, used when `transport = "smtp"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    /// Empty disables authentication.
    pub username: String,
    /// Resolved at load time from the variable named by `password_env`.
    #[serde(skip_serializing)]
    pub password: String,
    pub password_env: String,
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: defaults::DEFAULT_SMTP_PORT,
            security: SmtpSecurity::default(),
            username: String::new(),
            password: String::new(),
            password_env: defaults::DEFAULT_SMTP_PASSWORD_ENV.to_string(),
            timeout_secs: defaults::DEFAULT_SMTP_TIMEOUT_SECS,
        }
    }
}

impl SmtpConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.trim().is_empty()
    }
}
