use std::collections::HashMap;
use std::io::Write;

use storesync_core::config::{defaults, MailTransportKind, SmtpSecurity, StoreSyncConfig};
use storesync_core::errors::ConfigError;

#[test]
fn defaults_validate() {
    let config = StoreSyncConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.similarity.default_threshold, 0.7);
    assert_eq!(config.generation.rag_max_examples, 3);
    assert_eq!(config.generation.rag_threshold, 0.6);
    assert_eq!(config.scheduler.max_retries, 3);
    assert_eq!(config.scheduler.task_timeout_secs, 120);
    assert_eq!(config.scheduler.sweep_interval_secs, 300);
    assert_eq!(config.email.rate_limit_every, 5);
    assert_eq!(config.email.transport, MailTransportKind::Logging);
    assert!(!config.ai.is_configured());
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let config = StoreSyncConfig::from_toml(
        r#"
        [similarity]
        default_threshold = 0.8

        [scheduler]
        worker_count = 2
        "#,
    )
    .unwrap();
    assert_eq!(config.similarity.default_threshold, 0.8);
    assert_eq!(config.similarity.default_limit, defaults::DEFAULT_SIMILARITY_LIMIT);
    assert_eq!(config.scheduler.worker_count, 2);
    assert_eq!(config.email.from_address, defaults::DEFAULT_FROM_ADDRESS);
}

#[test]
fn invalid_toml_is_parse_error() {
    let err = StoreSyncConfig::from_toml("[storage\ndb_path = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn out_of_range_threshold_fails_validation() {
    let config = StoreSyncConfig::from_toml("[generation]\nrag_threshold = 1.5").unwrap();
    match config.validate() {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "generation.rag_threshold")
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn zero_workers_fails_validation() {
    let config = StoreSyncConfig::from_toml("[scheduler]\nworker_count = 0").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn env_overrides_apply_api_key_and_numbers() {
    let env: HashMap<&str, &str> = [
        ("OPENAI_API_KEY", "sk-test"),
        ("STORESYNC_WORKER_COUNT", "8"),
        ("STORESYNC_SWEEP_INTERVAL_SECS", "not-a-number"),
        ("STORESYNC_DB_PATH", ":memory:"),
    ]
    .into_iter()
    .collect();

    let mut config = StoreSyncConfig::default();
    config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

    assert!(config.ai.is_configured());
    assert_eq!(config.scheduler.worker_count, 8);
    assert_eq!(config.scheduler.sweep_interval_secs, defaults::DEFAULT_SWEEP_INTERVAL_SECS);
    assert!(config.storage.is_in_memory());
}

#[test]
fn custom_api_key_env_is_honored() {
    let mut config = StoreSyncConfig::from_toml("[ai]\napi_key_env = \"MY_LLM_KEY\"").unwrap();
    config.apply_env_overrides(|key| (key == "MY_LLM_KEY").then(|| "k".to_string()));
    assert_eq!(config.ai.api_key, "k");
}

#[test]
fn smtp_section_parses_and_password_comes_from_env() {
    let mut config = StoreSyncConfig::from_toml(
        r#"
        [email]
        transport = "smtp"

        [email.smtp]
        host = "smtp.example.com"
        port = 465
        security = "tls"
        username = "mailer"
        "#,
    )
    .unwrap();
    config.apply_env_overrides(|key| (key == "STORESYNC_SMTP_PASSWORD").then(|| "pw".to_string()));

    assert_eq!(config.email.transport, MailTransportKind::Smtp);
    assert_eq!(config.email.smtp.host, "smtp.example.com");
    assert_eq!(config.email.smtp.port, 465);
    assert_eq!(config.email.smtp.security, SmtpSecurity::Tls);
    assert!(config.email.smtp.has_credentials());
    assert_eq!(config.email.smtp.password, "pw");
    assert!(config.validate().is_ok());
}

#[test]
fn smtp_transport_without_host_fails_validation() {
    let mut config = StoreSyncConfig::default();
    config.apply_env_overrides(|key| (key == "STORESYNC_MAIL_TRANSPORT").then(|| "SMTP".to_string()));
    assert_eq!(config.email.transport, MailTransportKind::Smtp);
    match config.validate() {
        Err(ConfigError::ValidationFailed { field, .. }) => assert_eq!(field, "email.smtp.host"),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[email]\nrate_limit_every = 10").unwrap();
    let config = StoreSyncConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.email.rate_limit_every, 10);
}

#[test]
fn load_missing_file_is_read_error() {
    let err = StoreSyncConfig::load(Some(std::path::Path::new("/nonexistent/storesync.toml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed { .. }));
}
