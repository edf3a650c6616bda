//! Nearest-neighbour search over stored campaign embeddings.
//!
//! Brute-force scan computing cosine distance in Rust. Rows whose stored
//! dimensionality differs from the query are skipped.

use rusqlite::{params, Connection};

use storesync_core::errors::StoreSyncResult;
use storesync_core::models::{CampaignStatus, SimilarityQuery, VectorMatch};

use super::bytes_to_f32_vec;
use crate::to_storage_err;

/// Campaigns within `query.max_distance()` of `query_embedding`, nearest first.
pub fn find_nearest(
    conn: &Connection,
    query_embedding: &[f32],
    query: &SimilarityQuery,
) -> StoreSyncResult<Vec<VectorMatch>> {
    let query_norm_sq: f64 = query_embedding.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    if query_norm_sq == 0.0 || query.limit == 0 {
        return Ok(vec![]);
    }
    let query_len = query_embedding.len();
    let max_distance = query.max_distance();

    let mut stmt = conn
        .prepare(
            "SELECT c.id, c.status, c.generated_content, c.embedding, c.embedding_dimensions,
                    b.name, l.name, t.name, t.campaign_type
             FROM location_campaigns c
             JOIN locations l ON l.id = c.location_id
             JOIN brands b ON b.id = l.brand_id
             JOIN campaign_templates t ON t.id = c.template_id
             WHERE c.embedding IS NOT NULL
               AND (?1 IS NULL OR l.brand_id = ?1)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![query.brand_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut matches = Vec::new();
    for row in rows {
        let (id, status, content, blob, dims, brand, location, template, campaign_type) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        if dims as usize != query_len || query.exclude_ids.contains(&id) {
            continue;
        }
        let status: CampaignStatus = status.parse()?;
        if !query.statuses.is_empty() && !query.statuses.contains(&status) {
            continue;
        }
        let distance = 1.0 - cosine_similarity(query_embedding, &bytes_to_f32_vec(&blob));
        if distance <= max_distance {
            matches.push(VectorMatch {
                campaign_id: id,
                brand_name: brand,
                location_name: location,
                template_name: template,
                campaign_type,
                status,
                generated_content: content,
                distance,
            });
        }
    }

    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(query.limit);
    Ok(matches)
}

/// Cosine similarity between two vectors. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
