//! # storesync
//!
//! Runtime facade for the StoreSync campaign workflow. [`StoreSync`] builds
//! storage, AI capabilities, the workflow service, content generation,
//! similarity search and email delivery from a [`StoreSyncConfig`];
//! [`StoreSync::start`] adds the background task runner and periodic sweeps.

pub mod runtime;

pub use runtime::{Background, Capabilities, SimilarTo, StoreSync};
pub use storesync_core::config::StoreSyncConfig;
pub use storesync_core::errors::{StoreSyncError, StoreSyncResult};
pub use storesync_core::models;
pub use storesync_scheduler::{Task, TaskRecord, TaskStatus};
