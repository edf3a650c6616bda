//! Query modules: free functions over a borrowed connection.

pub mod campaign_crud;
pub mod maintenance;
pub mod master_data;
pub mod recipient_ops;
pub mod vector_search;

use chrono::{DateTime, SecondsFormat, Utc};

use storesync_core::errors::{StorageError, StoreSyncResult};

/// Fixed-width RFC 3339 so lexical order matches chronological order.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(table: &str, raw: &str) -> StoreSyncResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptRow {
                table: table.to_string(),
                details: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}

pub(crate) fn parse_opt_ts(
    table: &str,
    raw: Option<String>,
) -> StoreSyncResult<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(table, &s)).transpose()
}

pub(crate) fn corrupt(table: &str, details: impl Into<String>) -> storesync_core::StoreSyncError {
    StorageError::CorruptRow {
        table: table.to_string(),
        details: details.into(),
    }
    .into()
}

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to an f32 vec.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Run `f` inside a named savepoint: released on success, rolled back on error.
pub(crate) fn with_savepoint<T, F>(
    conn: &rusqlite::Connection,
    name: &str,
    f: F,
) -> StoreSyncResult<T>
where
    F: FnOnce() -> StoreSyncResult<T>,
{
    conn.execute_batch(&format!("SAVEPOINT {name}"))
        .map_err(|e| crate::to_storage_err(format!("{name} savepoint: {e}")))?;
    match f() {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name}"))
                .map_err(|e| crate::to_storage_err(format!("{name} release: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch(&format!("ROLLBACK TO {name}"));
            let _ = conn.execute_batch(&format!("RELEASE {name}"));
            Err(e)
        }
    }
}
