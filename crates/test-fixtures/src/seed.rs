//! Seeded in-memory storage shared by integration tests.
//!
//! Layout:
//! - brand `b1` "Acme Fuel" with locations `l1` "Downtown", `l2` "Uptown" and
//!   template `t1`
//! - brand `b2` "Beta Mart" with location `l3` "Harbor" and template `t2`

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use storesync_core::context_map;
use storesync_core::models::{
    Brand, CampaignStatus, CampaignTemplate, Location, LocationCampaign,
};
use storesync_core::traits::ICampaignStorage;
use storesync_storage::StorageEngine;

pub const T1_CONTENT: &str = "Visit {{ location_name }} for {{ brand_name }} deals!";
pub const T2_CONTENT: &str = "{{ brand_name }} {{#if has_drive_thru}}drive-thru {{/if}}savings at {{ location_name }}";

/// A fixed instant in June 2025.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

pub fn brand(id: &str, name: &str) -> Brand {
    Brand {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        created_at: at(1, 0),
    }
}

pub fn location(id: &str, brand_id: &str, name: &str) -> Location {
    Location {
        id: id.to_string(),
        brand_id: brand_id.to_string(),
        name: name.to_string(),
        store_number: "042".to_string(),
        street: "123 Main St".to_string(),
        city: "Austin".to_string(),
        state: "TX".to_string(),
        zip_code: "78701".to_string(),
        attributes: context_map! { "has_drive_thru" => true },
        is_active: true,
        created_at: at(1, 0),
    }
}

pub fn template(id: &str, brand_id: &str, content: &str) -> CampaignTemplate {
    CampaignTemplate {
        id: id.to_string(),
        brand_id: brand_id.to_string(),
        name: "Summer Sale".to_string(),
        campaign_type: "seasonal".to_string(),
        content: content.to_string(),
        required_variables: vec!["location_name".to_string()],
        is_active: true,
        created_at: at(1, 0),
        updated_at: at(1, 0),
    }
}

/// In-memory engine with two brands, three locations and two templates.
pub fn seeded_storage() -> Arc<StorageEngine> {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.upsert_brand(&brand("b1", "Acme Fuel")).unwrap();
    engine.upsert_brand(&brand("b2", "Beta Mart")).unwrap();
    engine.upsert_location(&location("l1", "b1", "Downtown")).unwrap();
    engine.upsert_location(&location("l2", "b1", "Uptown")).unwrap();
    engine.upsert_location(&location("l3", "b2", "Harbor")).unwrap();
    engine.upsert_template(&template("t1", "b1", T1_CONTENT)).unwrap();
    engine.upsert_template(&template("t2", "b2", T2_CONTENT)).unwrap();
    Arc::new(engine)
}

/// Insert a campaign in `status`.
pub fn seed_campaign(
    engine: &StorageEngine,
    location_id: &str,
    template_id: &str,
    status: CampaignStatus,
) -> LocationCampaign {
    seed_campaign_with(engine, location_id, template_id, |c| c.status = status)
}

/// Insert a draft campaign after applying `customize`.
pub fn seed_campaign_with<F>(
    engine: &StorageEngine,
    location_id: &str,
    template_id: &str,
    customize: F,
) -> LocationCampaign
where
    F: FnOnce(&mut LocationCampaign),
{
    let mut campaign = LocationCampaign::new(location_id, template_id, Some("u1"));
    customize(&mut campaign);
    engine.insert_campaign(&campaign).unwrap();
    campaign
}
