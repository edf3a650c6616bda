//! Brand, location, and template rows.

use rusqlite::{params, Connection, OptionalExtension, Row};

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{Brand, CampaignTemplate, ContextMap, Location};

use super::{corrupt, fmt_ts, parse_ts};
use crate::to_storage_err;

pub fn upsert_brand(conn: &Connection, brand: &Brand) -> StoreSyncResult<()> {
    conn.execute(
        "INSERT INTO brands (id, name, slug, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, slug = excluded.slug",
        params![brand.id, brand.name, brand.slug, fmt_ts(&brand.created_at)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_brand(conn: &Connection, id: &str) -> StoreSyncResult<Option<Brand>> {
    let raw = conn
        .query_row(
            "SELECT id, name, slug, created_at FROM brands WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|(id, name, slug, created_at)| {
        Ok(Brand {
            id,
            name,
            slug,
            created_at: parse_ts("brands", &created_at)?,
        })
    })
    .transpose()
}

pub fn upsert_location(conn: &Connection, location: &Location) -> StoreSyncResult<()> {
    let attributes = serde_json::to_string(&location.attributes)?;
    conn.execute(
        "INSERT INTO locations
            (id, brand_id, name, store_number, street, city, state, zip_code,
             attributes, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
            brand_id = excluded.brand_id,
            name = excluded.name,
            store_number = excluded.store_number,
            street = excluded.street,
            city = excluded.city,
            state = excluded.state,
            zip_code = excluded.zip_code,
            attributes = excluded.attributes,
            is_active = excluded.is_active",
        params![
            location.id,
            location.brand_id,
            location.name,
            location.store_number,
            location.street,
            location.city,
            location.state,
            location.zip_code,
            attributes,
            location.is_active,
            fmt_ts(&location.created_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

struct RawLocation {
    id: String,
    brand_id: String,
    name: String,
    store_number: String,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    attributes: String,
    is_active: bool,
    created_at: String,
}

fn read_location(row: &Row<'_>) -> rusqlite::Result<RawLocation> {
    Ok(RawLocation {
        id: row.get(0)?,
        brand_id: row.get(1)?,
        name: row.get(2)?,
        store_number: row.get(3)?,
        street: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        zip_code: row.get(7)?,
        attributes: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl RawLocation {
    fn into_location(self) -> StoreSyncResult<Location> {
        let attributes: ContextMap = serde_json::from_str(&self.attributes)
            .map_err(|e| corrupt("locations", format!("attributes: {e}")))?;
        Ok(Location {
            id: self.id,
            brand_id: self.brand_id,
            name: self.name,
            store_number: self.store_number,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            attributes,
            is_active: self.is_active,
            created_at: parse_ts("locations", &self.created_at)?,
        })
    }
}

pub fn get_location(conn: &Connection, id: &str) -> StoreSyncResult<Option<Location>> {
    conn.query_row(
        "SELECT id, brand_id, name, store_number, street, city, state, zip_code,
                attributes, is_active, created_at
         FROM locations WHERE id = ?1",
        params![id],
        read_location,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .map(RawLocation::into_location)
    .transpose()
}

pub fn upsert_template(conn: &Connection, template: &CampaignTemplate) -> StoreSyncResult<()> {
    let required = serde_json::to_string(&template.required_variables)?;
    conn.execute(
        "INSERT INTO campaign_templates
            (id, brand_id, name, campaign_type, content, required_variables,
             is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            brand_id = excluded.brand_id,
            name = excluded.name,
            campaign_type = excluded.campaign_type,
            content = excluded.content,
            required_variables = excluded.required_variables,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at",
        params![
            template.id,
            template.brand_id,
            template.name,
            template.campaign_type,
            template.content,
            required,
            template.is_active,
            fmt_ts(&template.created_at),
            fmt_ts(&template.updated_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

struct RawTemplate {
    id: String,
    brand_id: String,
    name: String,
    campaign_type: String,
    content: String,
    required_variables: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

pub fn get_template(conn: &Connection, id: &str) -> StoreSyncResult<Option<CampaignTemplate>> {
    let raw = conn
        .query_row(
            "SELECT id, brand_id, name, campaign_type, content, required_variables,
                    is_active, created_at, updated_at
             FROM campaign_templates WHERE id = ?1",
            params![id],
            |row| {
                Ok(RawTemplate {
                    id: row.get(0)?,
                    brand_id: row.get(1)?,
                    name: row.get(2)?,
                    campaign_type: row.get(3)?,
                    content: row.get(4)?,
                    required_variables: row.get(5)?,
                    is_active: row.get(6)?,
                    created_at: row.get(7)?,
                    updated_at: row.get(8)?,
                })
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    raw.map(|t| {
        let required_variables: Vec<String> = serde_json::from_str(&t.required_variables)
            .map_err(|e| corrupt("campaign_templates", format!("required_variables: {e}")))?;
        Ok(CampaignTemplate {
            id: t.id,
            brand_id: t.brand_id,
            name: t.name,
            campaign_type: t.campaign_type,
            content: t.content,
            required_variables,
            is_active: t.is_active,
            created_at: parse_ts("campaign_templates", &t.created_at)?,
            updated_at: parse_ts("campaign_templates", &t.updated_at)?,
        })
    })
    .transpose()
}
