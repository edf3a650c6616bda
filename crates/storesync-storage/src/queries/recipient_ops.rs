//! Email recipient rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{EmailRecipient, NewRecipient, RecipientStats, RecipientStatus};

use super::{fmt_ts, parse_opt_ts, parse_ts, with_savepoint};
use crate::to_storage_err;

const RECIPIENT_COLUMNS: &str =
    "id, campaign_id, email, name, status, sent_at, error_message, created_at";

type RawRecipient = (String, String, String, String, String, Option<String>, String, String);

fn read_recipient(row: &Row<'_>) -> rusqlite::Result<RawRecipient> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_recipient(raw: RawRecipient) -> StoreSyncResult<EmailRecipient> {
    let (id, campaign_id, email, name, status, sent_at, error_message, created_at) = raw;
    Ok(EmailRecipient {
        id,
        campaign_id,
        email,
        name,
        status: status.parse()?,
        sent_at: parse_opt_ts("email_recipients", sent_at)?,
        error_message,
        created_at: parse_ts("email_recipients", &created_at)?,
    })
}

/// Insert all rows in one savepoint; duplicates of existing addresses are
/// ignored. Returns the number inserted.
pub fn insert_recipients(
    conn: &Connection,
    campaign_id: &str,
    recipients: &[NewRecipient],
) -> StoreSyncResult<usize> {
    with_savepoint(conn, "insert_recipients", || {
        let now = fmt_ts(&Utc::now());
        let mut stmt = conn
            .prepare(
                "INSERT OR IGNORE INTO email_recipients
                    (id, campaign_id, email, name, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let mut created = 0;
        for r in recipients {
            created += stmt
                .execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    campaign_id,
                    r.email,
                    r.name,
                    now
                ])
                .map_err(|e| to_storage_err(e.to_string()))?;
        }
        Ok(created)
    })
}

pub fn list_recipients(
    conn: &Connection,
    campaign_id: &str,
    status: Option<RecipientStatus>,
) -> StoreSyncResult<Vec<EmailRecipient>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECIPIENT_COLUMNS} FROM email_recipients
             WHERE campaign_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at, email"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(
            params![campaign_id, status.map(|s| s.as_str())],
            read_recipient,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_recipient(row.map_err(|e| to_storage_err(e.to_string()))?)?);
    }
    Ok(out)
}

/// The subset of `ids` that belongs to `campaign_id`.
pub fn get_recipients(
    conn: &Connection,
    campaign_id: &str,
    ids: &[String],
) -> StoreSyncResult<Vec<EmailRecipient>> {
    Ok(list_recipients(conn, campaign_id, None)?
        .into_iter()
        .filter(|r| ids.contains(&r.id))
        .collect())
}

pub fn mark_sent(conn: &Connection, id: &str, at: &DateTime<Utc>) -> StoreSyncResult<()> {
    conn.execute(
        "UPDATE email_recipients SET status = 'sent', sent_at = ?2, error_message = ''
         WHERE id = ?1",
        params![id, fmt_ts(at)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn mark_failed(conn: &Connection, id: &str, error: &str) -> StoreSyncResult<()> {
    conn.execute(
        "UPDATE email_recipients SET status = 'failed', error_message = ?2 WHERE id = ?1",
        params![id, error],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn clear_pending(conn: &Connection, campaign_id: &str) -> StoreSyncResult<usize> {
    conn.execute(
        "DELETE FROM email_recipients WHERE campaign_id = ?1 AND status = 'pending'",
        params![campaign_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn stats(conn: &Connection, campaign_id: &str) -> StoreSyncResult<RecipientStats> {
    let mut stmt = conn
        .prepare(
            "SELECT status, COUNT(*) FROM email_recipients WHERE campaign_id = ?1 GROUP BY status",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![campaign_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stats = RecipientStats::default();
    for row in rows {
        let (status, count) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let count = count as usize;
        match status.parse::<RecipientStatus>()? {
            RecipientStatus::Pending => stats.pending = count,
            RecipientStatus::Sent => stats.sent = count,
            RecipientStatus::Failed => stats.failed = count,
        }
        stats.total += count;
    }
    Ok(stats)
}
