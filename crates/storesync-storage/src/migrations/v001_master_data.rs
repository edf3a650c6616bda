//! v001: brands, locations, campaign_templates.

use rusqlite::Connection;

use storesync_core::errors::StoreSyncResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreSyncResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS brands (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS locations (
            id            TEXT PRIMARY KEY,
            brand_id      TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            name          TEXT NOT NULL,
            store_number  TEXT NOT NULL DEFAULT '',
            street        TEXT NOT NULL DEFAULT '',
            city          TEXT NOT NULL DEFAULT '',
            state         TEXT NOT NULL DEFAULT '',
            zip_code      TEXT NOT NULL DEFAULT '',
            attributes    TEXT NOT NULL DEFAULT '{}',
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_locations_brand ON locations(brand_id);

        CREATE TABLE IF NOT EXISTS campaign_templates (
            id                  TEXT PRIMARY KEY,
            brand_id            TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            name                TEXT NOT NULL,
            campaign_type       TEXT NOT NULL DEFAULT 'promotion',
            content             TEXT NOT NULL,
            required_variables  TEXT NOT NULL DEFAULT '[]',
            is_active           INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_templates_brand ON campaign_templates(brand_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
