//! Tracing setup: subscriber initialization, span definitions, and event helpers.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;

use storesync_core::config::ObservabilityConfig;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "STORESYNC_LOG";

/// Install the global subscriber. `STORESYNC_LOG` wins over the configured
/// filter. Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    let installed = if config.json {
        builder
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

/// Install a plain-text subscriber with an explicit filter (tests, tools).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .try_init()
        .is_ok()
}
