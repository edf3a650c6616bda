//! One row per successful transition. Rows are never updated; only the
//! retention purge deletes them.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{ApprovalStep, NewApprovalStep};

use crate::queries::{fmt_ts, parse_ts};
use crate::to_storage_err;

pub struct ApprovalLog;

impl ApprovalLog {
    /// Append a step and return it with its assigned id.
    pub fn append(conn: &Connection, step: &NewApprovalStep) -> StoreSyncResult<ApprovalStep> {
        conn.execute(
            "INSERT INTO approval_steps
                (campaign_id, actor, decision, comments, previous_status, new_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                step.campaign_id,
                step.actor,
                step.decision.as_str(),
                step.comments,
                step.previous_status.as_str(),
                step.new_status.as_str(),
                fmt_ts(&step.created_at),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(ApprovalStep {
            id: conn.last_insert_rowid(),
            campaign_id: step.campaign_id.clone(),
            actor: step.actor.clone(),
            decision: step.decision,
            comments: step.comments.clone(),
            previous_status: step.previous_status,
            new_status: step.new_status,
            created_at: step.created_at,
        })
    }

    /// Steps for a campaign, newest first.
    pub fn history(conn: &Connection, campaign_id: &str) -> StoreSyncResult<Vec<ApprovalStep>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, campaign_id, actor, decision, comments, previous_status,
                        new_status, created_at
                 FROM approval_steps WHERE campaign_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map(params![campaign_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .map_err(|e| to_storage_err(e.to_string()))?;

        let mut steps = Vec::new();
        for row in rows {
            let (id, campaign_id, actor, decision, comments, previous, new, created_at) =
                row.map_err(|e| to_storage_err(e.to_string()))?;
            steps.push(ApprovalStep {
                id,
                campaign_id,
                actor,
                decision: decision.parse()?,
                comments,
                previous_status: previous.parse()?,
                new_status: new.parse()?,
                created_at: parse_ts("approval_steps", &created_at)?,
            });
        }
        Ok(steps)
    }

    /// Delete steps older than `cutoff` whose campaign is completed.
    pub fn purge(conn: &Connection, cutoff: &DateTime<Utc>) -> StoreSyncResult<usize> {
        conn.execute(
            "DELETE FROM approval_steps
             WHERE created_at < ?1
               AND campaign_id IN (
                   SELECT id FROM location_campaigns WHERE status = 'completed'
               )",
            params![fmt_ts(cutoff)],
        )
        .map_err(|e| to_storage_err(e.to_string()))
    }
}
