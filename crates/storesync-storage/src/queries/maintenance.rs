//! Retention, checkpoint, and integrity checks.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use storesync_core::errors::StoreSyncResult;

use crate::audit::ApprovalLog;
use crate::to_storage_err;

/// Purge approval steps of completed campaigns older than `cutoff`.
pub fn purge_approval_steps(conn: &Connection, cutoff: &DateTime<Utc>) -> StoreSyncResult<usize> {
    ApprovalLog::purge(conn, cutoff)
}

/// WAL checkpoint.
pub fn wal_checkpoint(conn: &Connection) -> StoreSyncResult<()> {
    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Run integrity check. Returns true if the database is OK.
pub fn integrity_check(conn: &Connection) -> StoreSyncResult<bool> {
    let result: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(result == "ok")
}
