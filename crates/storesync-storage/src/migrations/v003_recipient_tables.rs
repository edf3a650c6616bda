//! v003: email_recipients.

use rusqlite::Connection;

use storesync_core::errors::StoreSyncResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreSyncResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS email_recipients (
            id             TEXT PRIMARY KEY,
            campaign_id    TEXT NOT NULL REFERENCES location_campaigns(id) ON DELETE CASCADE,
            email          TEXT NOT NULL,
            name           TEXT NOT NULL DEFAULT '',
            status         TEXT NOT NULL DEFAULT 'pending'
                           CHECK (status IN ('pending', 'sent', 'failed')),
            sent_at        TEXT,
            error_message  TEXT NOT NULL DEFAULT '',
            created_at     TEXT NOT NULL,
            UNIQUE (campaign_id, email)
        );

        CREATE INDEX IF NOT EXISTS idx_recipients_campaign_status
            ON email_recipients(campaign_id, status);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
