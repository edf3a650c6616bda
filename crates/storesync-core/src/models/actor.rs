use serde::{Deserialize, Serialize};

use crate::constants::SYSTEM_ACTOR;

/// Role of an acting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BrandManager,
    LocationManager,
    Viewer,
}

/// An authenticated identity performing workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    /// Brands this actor may act on. Ignored for admins.
    #[serde(default)]
    pub brand_ids: Vec<String>,
    /// Locations a location manager may act on.
    #[serde(default)]
    pub location_ids: Vec<String>,
}

impl Actor {
    pub fn new(id: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            role,
            brand_ids: Vec::new(),
            location_ids: Vec::new(),
        }
    }

    pub fn with_brand(mut self, brand_id: &str) -> Self {
        self.brand_ids.push(brand_id.to_string());
        self
    }

    pub fn with_location(mut self, location_id: &str) -> Self {
        self.location_ids.push(location_id.to_string());
        self
    }

    /// The identity recorded for sweep-triggered transitions.
    pub fn system() -> Self {
        Self::new(SYSTEM_ACTOR, Role::Admin)
    }

    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_ACTOR
    }
}
