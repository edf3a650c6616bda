//! Versioned schema migrations, recorded in `schema_version`.

mod v001_master_data;
mod v002_campaign_tables;
mod v003_recipient_tables;

use rusqlite::{params, Connection};
use tracing::info;

use storesync_core::errors::{StorageError, StoreSyncResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> StoreSyncResult<()>;

/// Ordered list of every migration.
const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[
    (1, "master_data", v001_master_data::migrate),
    (2, "campaign_tables", v002_campaign_tables::migrate),
    (3, "recipient_tables", v003_recipient_tables::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded version.
/// Each migration runs inside its own savepoint.
pub fn run_migrations(conn: &Connection) -> StoreSyncResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    let mut applied = current;
    for (version, name, migrate) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        conn.execute_batch("SAVEPOINT migration")
            .map_err(|e| to_storage_err(e.to_string()))?;
        let result = migrate(conn).and_then(|()| {
            conn.execute(
                "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
                params![version, name],
            )
            .map(|_| ())
            .map_err(|e| to_storage_err(e.to_string()))
        });
        match result {
            Ok(()) => {
                conn.execute_batch("RELEASE migration")
                    .map_err(|e| to_storage_err(e.to_string()))?;
                info!(version, name, "applied migration");
                applied = *version;
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK TO migration");
                let _ = conn.execute_batch("RELEASE migration");
                return Err(StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                }
                .into());
            }
        }
    }
    Ok(applied)
}

/// Highest applied migration, or 0 on a fresh database.
pub fn current_version(conn: &Connection) -> StoreSyncResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
