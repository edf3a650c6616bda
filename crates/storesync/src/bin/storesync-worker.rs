//! storesync-worker: background task workers plus periodic campaign sweeps.
//!
//! ## Configuration
//! - STORESYNC_CONFIG: path to a TOML config file (optional; the first
//!   argument takes precedence)
//! - STORESYNC_*: per-key overrides, see `StoreSyncConfig::apply_env_overrides`
//! - STORESYNC_LOG: log filter

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use storesync::{StoreSync, StoreSyncConfig};
use storesync_core::constants::VERSION;
use storesync_observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("STORESYNC_CONFIG").ok())
        .map(PathBuf::from);
    let config = StoreSyncConfig::load(path.as_deref())
        .with_context(|| format!("failed to load configuration from {path:?}"))?;
    init_tracing(&config.observability);

    info!(version = VERSION, db_path = %config.storage.db_path, "starting storesync-worker");
    let runtime = StoreSync::open(config).context("failed to open storesync runtime")?;
    let background = runtime.start();

    info!("worker running, press Ctrl+C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("shutting down");
    background.shutdown().await;
    Ok(())
}
