//! Test fixtures for StoreSync: mock capabilities, seeded storage, and golden
//! datasets loaded from `data/`.

pub mod mocks;
pub mod seed;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use storesync_core::models::ContextMap;

pub use mocks::{
    deterministic_vector, DeterministicEmbedder, FailingCompleter, FailingEmbedder, FixedEmbedder,
    RecordingTransport, ScriptedCompleter,
};
pub use seed::{at, seed_campaign, seed_campaign_with, seeded_storage};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file under `data/`.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// One golden template rendering case.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderCase {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub context: ContextMap,
    /// Expected strict output; `None` when strict rendering must fail.
    pub strict: Option<String>,
    pub lenient: String,
    pub variables: Vec<String>,
}

pub fn render_cases() -> Vec<RenderCase> {
    load_fixture("templates/render_cases.json")
}
