//! # storesync-storage
//!
//! SQLite persistence layer: a single write connection plus a read pool,
//! versioned migrations, the approval audit log, and brute-force cosine
//! search over stored campaign embeddings.

pub mod audit;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use storesync_core::errors::{StorageError, StoreSyncError};

/// Wrap a lower-level failure as a storage error.
pub(crate) fn to_storage_err(message: String) -> StoreSyncError {
    StoreSyncError::StorageError(StorageError::SqliteError { message })
}
