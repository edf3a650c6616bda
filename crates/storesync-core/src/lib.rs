//! # storesync-core
//!
//! Foundation crate for the StoreSync campaign workflow.
//! Defines the domain models, capability traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use cancel::CancelToken;
pub use config::StoreSyncConfig;
pub use errors::{StoreSyncError, StoreSyncResult};
pub use models::{CampaignStatus, ContextMap, ContextValue, LocationCampaign, TransitionAction};
