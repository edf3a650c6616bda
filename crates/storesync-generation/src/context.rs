//! Render-context assembly.

use storesync_core::context_map;
use storesync_core::models::{CampaignBundle, ContextMap};

/// Merge, in increasing precedence: brand fields, location fields, location
/// attributes, campaign customizations. Later sources overwrite earlier keys.
pub fn build_context(bundle: &CampaignBundle) -> ContextMap {
    let CampaignBundle {
        campaign,
        location,
        brand,
        template,
    } = bundle;

    let mut ctx = context_map! {
        "brand_name" => brand.name.as_str(),
        "brand_slug" => brand.slug.as_str(),
        "location_name" => location.name.as_str(),
        "store_number" => location.store_number.as_str(),
        "full_address" => location.full_address(),
        "street" => location.street.as_str(),
        "city" => location.city.as_str(),
        "state" => location.state.as_str(),
        "zip" => location.zip_code.as_str(),
        "template_name" => template.name.as_str(),
        "campaign_type" => template.campaign_type.as_str(),
    };
    ctx.extend(location.attributes.clone());
    ctx.extend(campaign.customizations.clone());
    ctx
}

/// Stand-in values for template previews.
pub fn sample_context() -> ContextMap {
    context_map! {
        "brand_name" => "Sample Brand",
        "brand_slug" => "sample-brand",
        "location_name" => "Downtown Store",
        "store_number" => "001",
        "full_address" => "123 Main St, Austin, TX, 78701",
        "street" => "123 Main St",
        "city" => "Austin",
        "state" => "TX",
        "zip" => "78701",
        "template_name" => "Sample Template",
        "campaign_type" => "promotion",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storesync_core::models::{ContextValue, LocationCampaign};
    use test_fixtures::seed::{brand, location, template};

    fn bundle() -> CampaignBundle {
        let mut location = location("l1", "b1", "Downtown");
        location.attributes = context_map! { "city" => "Round Rock", "parking" => "free" };
        let mut campaign = LocationCampaign::new("l1", "t1", None);
        campaign.customizations = context_map! { "parking" => "valet", "discount" => 20i64 };
        CampaignBundle {
            campaign,
            location,
            brand: brand("b1", "Acme Fuel"),
            template: template("t1", "b1", "{{ brand_name }}"),
        }
    }

    #[test]
    fn later_sources_override_earlier_keys() {
        let ctx = build_context(&bundle());
        assert_eq!(ctx["brand_name"], ContextValue::from("Acme Fuel"));
        assert_eq!(ctx["city"], ContextValue::from("Round Rock"));
        assert_eq!(ctx["parking"], ContextValue::from("valet"));
        assert_eq!(ctx["discount"], ContextValue::from(20i64));
    }

    #[test]
    fn address_parts_use_template_facing_keys() {
        let ctx = build_context(&bundle());
        assert_eq!(ctx["zip"], ContextValue::from("78701"));
        assert_eq!(ctx["street"], ContextValue::from("123 Main St"));
        assert!(!ctx.contains_key("zip_code"));
        assert_eq!(
            crate::template::render("{{ city }} {{ zip }}", &ctx, crate::RenderMode::Strict).unwrap(),
            "Round Rock 78701"
        );
        assert!(sample_context().contains_key("zip"));
    }

    #[test]
    fn full_address_joins_non_empty_parts() {
        let mut b = bundle();
        b.location.street = String::new();
        let ctx = build_context(&b);
        assert_eq!(ctx["full_address"], ContextValue::from("Austin, TX, 78701"));
    }
}
