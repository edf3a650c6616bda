use chrono::{DateTime, TimeZone, Utc};

use storesync_core::context_map;
use storesync_core::models::{Brand, CampaignTemplate, Location, LocationCampaign};
use storesync_core::traits::ICampaignStorage;
use storesync_storage::StorageEngine;

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

pub fn seed_brand(engine: &StorageEngine, id: &str, name: &str) {
    engine
        .upsert_brand(&Brand {
            id: id.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            created_at: ts(1, 0),
        })
        .unwrap();
}

pub fn seed_location(engine: &StorageEngine, id: &str, brand_id: &str, name: &str) {
    engine
        .upsert_location(&Location {
            id: id.to_string(),
            brand_id: brand_id.to_string(),
            name: name.to_string(),
            store_number: "001".to_string(),
            street: "123 Main St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip_code: "78701".to_string(),
            attributes: context_map! { "has_drive_thru" => true },
            is_active: true,
            created_at: ts(1, 0),
        })
        .unwrap();
}

pub fn seed_template(engine: &StorageEngine, id: &str, brand_id: &str) {
    engine
        .upsert_template(&CampaignTemplate {
            id: id.to_string(),
            brand_id: brand_id.to_string(),
            name: "Summer Sale".to_string(),
            campaign_type: "promotion".to_string(),
            content: "Visit {{ location_name }} today!".to_string(),
            required_variables: vec!["location_name".to_string()],
            is_active: true,
            created_at: ts(1, 0),
            updated_at: ts(1, 0),
        })
        .unwrap();
}

/// One brand, one location, one template, one draft campaign.
pub fn seeded_engine() -> (StorageEngine, LocationCampaign) {
    let engine = StorageEngine::open_in_memory().unwrap();
    seed_brand(&engine, "b1", "Acme Fuel");
    seed_location(&engine, "l1", "b1", "Downtown");
    seed_template(&engine, "t1", "b1");
    let campaign = LocationCampaign::new("l1", "t1", Some("u1"));
    engine.insert_campaign(&campaign).unwrap();
    (engine, campaign)
}
