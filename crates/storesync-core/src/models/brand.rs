use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContextMap;

/// A retail brand (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A physical store belonging to a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub store_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Free-form attributes (e.g. `has_drive_thru`, `seating_capacity`).
    pub attributes: ContextMap,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Non-empty address parts joined by ", ".
    pub fn full_address(&self) -> String {
        [&self.street, &self.city, &self.state, &self.zip_code]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
