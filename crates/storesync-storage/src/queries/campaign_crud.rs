//! Campaign rows: CRUD, status compare-and-set, generated artifacts, sweep lookups.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use storesync_core::errors::{StorageError, StoreSyncResult};
use storesync_core::models::{
    CampaignBundle, CampaignStatus, ContextMap, GeneratedEmail, LocationCampaign,
};

use super::master_data;
use super::{bytes_to_f32_vec, corrupt, f32_vec_to_bytes, fmt_ts, parse_opt_ts, parse_ts};
use crate::to_storage_err;

const CAMPAIGN_COLUMNS: &str = "id, location_id, template_id, created_by, status, customizations,
    generated_content, generated_html_email, email_subject, email_preview_text,
    embedding, embedding_dimensions, scheduled_start, scheduled_end, created_at, updated_at";

struct RawCampaign {
    id: String,
    location_id: String,
    template_id: String,
    created_by: Option<String>,
    status: String,
    customizations: String,
    generated_content: String,
    generated_html_email: String,
    email_subject: String,
    email_preview_text: String,
    embedding: Option<Vec<u8>>,
    embedding_dimensions: Option<i64>,
    scheduled_start: Option<String>,
    scheduled_end: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_campaign(row: &Row<'_>) -> rusqlite::Result<RawCampaign> {
    Ok(RawCampaign {
        id: row.get(0)?,
        location_id: row.get(1)?,
        template_id: row.get(2)?,
        created_by: row.get(3)?,
        status: row.get(4)?,
        customizations: row.get(5)?,
        generated_content: row.get(6)?,
        generated_html_email: row.get(7)?,
        email_subject: row.get(8)?,
        email_preview_text: row.get(9)?,
        embedding: row.get(10)?,
        embedding_dimensions: row.get(11)?,
        scheduled_start: row.get(12)?,
        scheduled_end: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

impl RawCampaign {
    fn into_campaign(self) -> StoreSyncResult<LocationCampaign> {
        const TABLE: &str = "location_campaigns";
        let status: CampaignStatus = self.status.parse()?;
        let customizations: ContextMap = serde_json::from_str(&self.customizations)
            .map_err(|e| corrupt(TABLE, format!("customizations: {e}")))?;
        let embedding = match (self.embedding, self.embedding_dimensions) {
            (Some(blob), Some(dims)) => {
                let vector = bytes_to_f32_vec(&blob);
                if vector.len() != dims as usize {
                    return Err(corrupt(
                        TABLE,
                        format!(
                            "embedding for {} has {} values, expected {dims}",
                            self.id,
                            vector.len()
                        ),
                    ));
                }
                Some(vector)
            }
            _ => None,
        };
        Ok(LocationCampaign {
            status,
            customizations,
            embedding,
            scheduled_start: parse_opt_ts(TABLE, self.scheduled_start)?,
            scheduled_end: parse_opt_ts(TABLE, self.scheduled_end)?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            updated_at: parse_ts(TABLE, &self.updated_at)?,
            id: self.id,
            location_id: self.location_id,
            template_id: self.template_id,
            created_by: self.created_by,
            generated_content: self.generated_content,
            generated_html_email: self.generated_html_email,
            email_subject: self.email_subject,
            email_preview_text: self.email_preview_text,
        })
    }
}

pub fn insert_campaign(conn: &Connection, c: &LocationCampaign) -> StoreSyncResult<()> {
    let customizations = serde_json::to_string(&c.customizations)?;
    let blob = c.embedding.as_deref().map(f32_vec_to_bytes);
    let dims = c.embedding.as_ref().map(|e| e.len() as i64);
    conn.execute(
        &format!(
            "INSERT INTO location_campaigns ({CAMPAIGN_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            c.id,
            c.location_id,
            c.template_id,
            c.created_by,
            c.status.as_str(),
            customizations,
            c.generated_content,
            c.generated_html_email,
            c.email_subject,
            c.email_preview_text,
            blob,
            dims,
            c.scheduled_start.as_ref().map(fmt_ts),
            c.scheduled_end.as_ref().map(fmt_ts),
            fmt_ts(&c.created_at),
            fmt_ts(&c.updated_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_campaign(conn: &Connection, id: &str) -> StoreSyncResult<Option<LocationCampaign>> {
    conn.query_row(
        &format!("SELECT {CAMPAIGN_COLUMNS} FROM location_campaigns WHERE id = ?1"),
        params![id],
        read_campaign,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .map(RawCampaign::into_campaign)
    .transpose()
}

/// Write editable fields. Status and embedding are owned by other paths.
pub fn update_campaign_fields(conn: &Connection, c: &LocationCampaign) -> StoreSyncResult<()> {
    let customizations = serde_json::to_string(&c.customizations)?;
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET
                template_id = ?2,
                customizations = ?3,
                generated_content = ?4,
                scheduled_start = ?5,
                scheduled_end = ?6,
                updated_at = ?7
             WHERE id = ?1",
            params![
                c.id,
                c.template_id,
                customizations,
                c.generated_content,
                c.scheduled_start.as_ref().map(fmt_ts),
                c.scheduled_end.as_ref().map(fmt_ts),
                fmt_ts(&Utc::now()),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(storesync_core::StoreSyncError::not_found("campaign", &c.id));
    }
    Ok(())
}

/// Approval steps and recipients go with it via ON DELETE CASCADE.
pub fn delete_campaign(conn: &Connection, id: &str) -> StoreSyncResult<bool> {
    let deleted = conn
        .execute("DELETE FROM location_campaigns WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted > 0)
}

fn query_campaigns(
    conn: &Connection,
    where_clause: &str,
    param: &str,
) -> StoreSyncResult<Vec<LocationCampaign>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM location_campaigns WHERE {where_clause}
             ORDER BY created_at DESC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![param], read_campaign)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut campaigns = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        campaigns.push(raw.into_campaign()?);
    }
    Ok(campaigns)
}

pub fn list_by_status(
    conn: &Connection,
    status: CampaignStatus,
) -> StoreSyncResult<Vec<LocationCampaign>> {
    query_campaigns(conn, "status = ?1", status.as_str())
}

pub fn list_by_location(
    conn: &Connection,
    location_id: &str,
) -> StoreSyncResult<Vec<LocationCampaign>> {
    query_campaigns(conn, "location_id = ?1", location_id)
}

/// Campaign plus its location, brand, and template.
pub fn load_bundle(conn: &Connection, id: &str) -> StoreSyncResult<Option<CampaignBundle>> {
    let Some(campaign) = get_campaign(conn, id)? else {
        return Ok(None);
    };
    let location = master_data::get_location(conn, &campaign.location_id)?
        .ok_or_else(|| corrupt("location_campaigns", format!("{id}: missing location")))?;
    let template = master_data::get_template(conn, &campaign.template_id)?
        .ok_or_else(|| corrupt("location_campaigns", format!("{id}: missing template")))?;
    let brand = master_data::get_brand(conn, &location.brand_id)?
        .ok_or_else(|| corrupt("locations", format!("{}: missing brand", location.id)))?;
    Ok(Some(CampaignBundle {
        campaign,
        location,
        brand,
        template,
    }))
}

/// Compare-and-set the status column. Fails with `ConcurrentUpdate` when the
/// stored status is no longer `expected`.
pub fn set_status_if(
    conn: &Connection,
    id: &str,
    expected: CampaignStatus,
    new_status: CampaignStatus,
    at: &DateTime<Utc>,
) -> StoreSyncResult<()> {
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET status = ?3, updated_at = ?4
             WHERE id = ?1 AND status = ?2",
            params![id, expected.as_str(), new_status.as_str(), fmt_ts(at)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        if get_campaign(conn, id)?.is_none() {
            return Err(storesync_core::StoreSyncError::not_found("campaign", id));
        }
        return Err(StorageError::ConcurrentUpdate {
            campaign_id: id.to_string(),
            expected: expected.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Overwrite the schedule window. Callers validate `start < end`.
pub fn set_window(
    conn: &Connection,
    id: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> StoreSyncResult<()> {
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET scheduled_start = ?2, scheduled_end = ?3
             WHERE id = ?1",
            params![id, fmt_ts(start), fmt_ts(end)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(storesync_core::StoreSyncError::not_found("campaign", id));
    }
    Ok(())
}

/// Store generated content, replacing the embedding when one is supplied and
/// clearing a stale one otherwise.
pub fn save_generated_content(
    conn: &Connection,
    id: &str,
    content: &str,
    embedding: Option<&[f32]>,
) -> StoreSyncResult<()> {
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET
                generated_content = ?2,
                embedding = ?3,
                embedding_dimensions = ?4,
                updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                content,
                embedding.map(f32_vec_to_bytes),
                embedding.map(|e| e.len() as i64),
                fmt_ts(&Utc::now()),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_found(changed, id)
}

pub fn save_embedding(conn: &Connection, id: &str, embedding: &[f32]) -> StoreSyncResult<()> {
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET embedding = ?2, embedding_dimensions = ?3, updated_at = ?4
             WHERE id = ?1",
            params![
                id,
                f32_vec_to_bytes(embedding),
                embedding.len() as i64,
                fmt_ts(&Utc::now())
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_found(changed, id)
}

pub fn save_email_content(
    conn: &Connection,
    id: &str,
    email: &GeneratedEmail,
) -> StoreSyncResult<()> {
    let changed = conn
        .execute(
            "UPDATE location_campaigns SET
                generated_html_email = ?2,
                email_subject = ?3,
                email_preview_text = ?4,
                updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                email.html,
                email.subject,
                email.preview_text,
                fmt_ts(&Utc::now())
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    ensure_found(changed, id)
}

fn ensure_found(changed: usize, id: &str) -> StoreSyncResult<()> {
    if changed == 0 {
        return Err(storesync_core::StoreSyncError::not_found("campaign", id));
    }
    Ok(())
}

fn ids_where(conn: &Connection, sql: &str, now: &DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![fmt_ts(now)], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// `scheduled` campaigns whose start has passed.
pub fn due_for_activation(conn: &Connection, now: &DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
    ids_where(
        conn,
        "SELECT id FROM location_campaigns
         WHERE status = 'scheduled' AND scheduled_start IS NOT NULL AND scheduled_start <= ?1
         ORDER BY scheduled_start",
        now,
    )
}

/// `active` campaigns whose end has passed.
pub fn due_for_completion(conn: &Connection, now: &DateTime<Utc>) -> StoreSyncResult<Vec<String>> {
    ids_where(
        conn,
        "SELECT id FROM location_campaigns
         WHERE status = 'active' AND scheduled_end IS NOT NULL AND scheduled_end <= ?1
         ORDER BY scheduled_end",
        now,
    )
}

/// Campaigns with non-empty content, missing an embedding unless `recompute`.
pub fn campaigns_needing_embedding(
    conn: &Connection,
    ids: Option<&[String]>,
    recompute: bool,
) -> StoreSyncResult<Vec<String>> {
    let embedding_clause = if recompute { "" } else { " AND embedding IS NULL" };
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id FROM location_campaigns
             WHERE TRIM(generated_content) != ''{embedding_clause}
             ORDER BY created_at"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let all = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(match ids {
        Some(wanted) => all.into_iter().filter(|id| wanted.contains(id)).collect(),
        None => all,
    })
}
