//! v002: location_campaigns, approval_steps.

use rusqlite::Connection;

use storesync_core::errors::StoreSyncResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreSyncResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS location_campaigns (
            id                    TEXT PRIMARY KEY,
            location_id           TEXT NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
            template_id           TEXT NOT NULL REFERENCES campaign_templates(id) ON DELETE CASCADE,
            created_by            TEXT,
            status                TEXT NOT NULL DEFAULT 'draft'
                                  CHECK (status IN ('draft', 'pending_review', 'approved',
                                                    'rejected', 'scheduled', 'active', 'completed')),
            customizations        TEXT NOT NULL DEFAULT '{}',
            generated_content     TEXT NOT NULL DEFAULT '',
            generated_html_email  TEXT NOT NULL DEFAULT '',
            email_subject         TEXT NOT NULL DEFAULT '',
            email_preview_text    TEXT NOT NULL DEFAULT '',
            embedding             BLOB,
            embedding_dimensions  INTEGER,
            scheduled_start       TEXT,
            scheduled_end         TEXT,
            created_at            TEXT NOT NULL,
            updated_at            TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_campaigns_status ON location_campaigns(status);
        CREATE INDEX IF NOT EXISTS idx_campaigns_location ON location_campaigns(location_id);
        CREATE INDEX IF NOT EXISTS idx_campaigns_start ON location_campaigns(status, scheduled_start);
        CREATE INDEX IF NOT EXISTS idx_campaigns_end ON location_campaigns(status, scheduled_end);

        CREATE TABLE IF NOT EXISTS approval_steps (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            campaign_id      TEXT NOT NULL REFERENCES location_campaigns(id) ON DELETE CASCADE,
            actor            TEXT NOT NULL,
            decision         TEXT NOT NULL,
            comments         TEXT NOT NULL DEFAULT '',
            previous_status  TEXT NOT NULL,
            new_status       TEXT NOT NULL,
            created_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_approval_campaign ON approval_steps(campaign_id);
        CREATE INDEX IF NOT EXISTS idx_approval_created ON approval_steps(created_at);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
