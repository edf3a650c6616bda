//! Cooperative cancellation for background attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{StoreSyncResult, TaskError};

/// Shared flag an attempt checks before it persists anything.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token is cancelled; `what` names the write
    /// being skipped.
    pub fn check(&self, what: &str) -> StoreSyncResult<()> {
        if self.is_cancelled() {
            return Err(TaskError::Cancelled {
                what: what.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
