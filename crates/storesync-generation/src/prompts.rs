//! Prompt construction for content, HTML email, and subject generation.

use storesync_core::constants::{
    RECIPIENT_NAME_PLACEHOLDER, SUBJECT_PROMPT_CONTENT_CHARS, UNSUBSCRIBE_LINK_PLACEHOLDER,
};
use storesync_core::models::{CampaignBundle, ContextMap, RagExample};

pub const CONTENT_SYSTEM_PROMPT: &str = "\
You write marketing copy for retail brands that operate many store locations.

Rules:
- Headlines and calls to action name the BRAND, never the individual store.
- Mention the store address only once, in a \"Visit us\" or directions section.
- Keep the copy short, energetic, and ready to publish.
- Never leave placeholders or bracketed notes in the output.

Return only the finished marketing copy with no preamble.";

pub const EMAIL_SYSTEM_PROMPT: &str = "\
You design HTML marketing emails for retail brands.

Rules:
- Produce one complete HTML document with inline CSS and table-based layout,
  at most 600px wide, readable on mobile clients.
- Include the literal placeholder {{recipient_name}} in the greeting and the
  literal placeholder {{unsubscribe_link}} as the href of an unsubscribe link
  in the footer.
- Lead with the brand, keep store details to a location section.

Return only the HTML document, starting with <!DOCTYPE html>.";

pub const SUBJECT_SYSTEM_PROMPT: &str =
    "You write email marketing copy. Reply with the requested text only.";

/// Color and tone guidance by campaign type.
fn style_guide(campaign_type: &str) -> &'static str {
    match campaign_type {
        "fuel" => "Deep blue with bright orange accents; bold price callouts; fast, practical tone.",
        "seasonal" => "Warm seasonal palette; soft backgrounds; friendly, festive tone.",
        "clearance" => "Red and yellow on white; large percentage-off badges; urgent tone.",
        "grand_opening" => "Celebratory gold and brand colors; ribbon or banner hero; welcoming tone.",
        "flash_sale" => "High-contrast black and hot pink; countdown feel; very urgent tone.",
        "loyalty" => "Rich purple or navy with silver; member-exclusive framing; appreciative tone.",
        "convenience" => "Fresh green and white; clean icons; helpful, everyday tone.",
        _ => "Brand-neutral navy and white with one accent color; clear, confident tone.",
    }
}

fn bullet_list(map: &ContextMap) -> String {
    if map.is_empty() {
        return "None specified".to_string();
    }
    map.iter()
        .map(|(k, v)| format!("- {k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_examples(examples: &[RagExample]) -> String {
    examples
        .iter()
        .enumerate()
        .map(|(i, ex)| {
            format!(
                "Example {} ({} - {}):\n{}",
                i + 1,
                ex.brand_name,
                ex.location_name,
                ex.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// User prompt for marketing-copy generation.
pub fn content_prompt(
    bundle: &CampaignBundle,
    examples: &[RagExample],
    extra_instructions: Option<&str>,
) -> String {
    let CampaignBundle {
        campaign,
        location,
        brand,
        template,
    } = bundle;

    let mut prompt = format!(
        "Write marketing copy for this campaign.\n\n\
         Brand: {brand_name}\n\
         Campaign type: {campaign_type}\n\
         Location: {location_name} (Store #{store_number})\n\
         Address: {address}\n\n\
         Template:\n{template_content}\n\n\
         Location attributes:\n{attributes}\n\n\
         Campaign customizations:\n{customizations}\n",
        brand_name = brand.name,
        campaign_type = template.campaign_type,
        location_name = location.name,
        store_number = location.store_number,
        address = location.full_address(),
        template_content = template.content,
        attributes = bullet_list(&location.attributes),
        customizations = bullet_list(&campaign.customizations),
    );

    if !examples.is_empty() {
        prompt.push_str("\nSimilar campaigns that performed well:\n");
        prompt.push_str(&format_examples(examples));
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nRequirements:\n\
         1. Use the brand name \"{}\" in headlines, not the store name.\n\
         2. Follow the structure the template suggests.\n\
         3. Give the address only in a \"Visit us at\" or directions section.\n\
         4. Make it ready to publish as-is.\n",
        brand.name
    ));
    if !examples.is_empty() {
        prompt.push_str("5. Match the tone and style of the similar campaigns above.\n");
    }
    prompt.push_str("\nMarketing copy:");

    if let Some(extra) = extra_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\n\nAdditional instructions: {extra}"));
    }
    prompt
}

/// User prompt turning finished copy into an HTML email.
pub fn html_email_prompt(bundle: &CampaignBundle, content: &str) -> String {
    let details = if bundle.campaign.customizations.is_empty() {
        "General promotion".to_string()
    } else {
        bundle
            .campaign
            .customizations
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Design an HTML marketing email.\n\n\
         Brand: {brand}\n\
         Campaign type: {campaign_type}\n\
         Offer details: {details}\n\n\
         Copy:\n{content}\n\n\
         Style: {style}\n\n\
         Layout:\n\
         - Hero section with the brand name and the main offer\n\
         - Body with the copy above, lightly formatted\n\
         - Location section: {location}, {address}\n\
         - Footer with {unsubscribe}\n\n\
         Greet the reader with {recipient}.\n\n\
         HTML email:",
        brand = bundle.brand.name,
        campaign_type = bundle.template.campaign_type,
        style = style_guide(&bundle.template.campaign_type),
        location = bundle.location.name,
        address = bundle.location.full_address(),
        unsubscribe = UNSUBSCRIBE_LINK_PLACEHOLDER,
        recipient = RECIPIENT_NAME_PLACEHOLDER,
    )
}

/// User prompt for a subject line.
pub fn subject_prompt(bundle: &CampaignBundle, content: &str) -> String {
    let excerpt: String = content.chars().take(SUBJECT_PROMPT_CONTENT_CHARS).collect();
    format!(
        "Write one email subject line.\n\n\
         Brand: {}\n\
         Campaign type: {}\n\
         Copy:\n{}\n\n\
         Requirements: at most 60 characters, include the brand name, create \
         urgency without spam words or all caps. Reply with the subject line only.\n\n\
         Subject line:",
        bundle.brand.name, bundle.template.campaign_type, excerpt
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storesync_core::context_map;
    use storesync_core::models::LocationCampaign;
    use test_fixtures::seed::{brand, location, template};

    fn bundle() -> CampaignBundle {
        let mut campaign = LocationCampaign::new("l1", "t1", None);
        campaign.customizations = context_map! { "discount" => "20%" };
        CampaignBundle {
            campaign,
            location: location("l1", "b1", "Downtown"),
            brand: brand("b1", "Acme Fuel"),
            template: template("t1", "b1", "Save at {{ location_name }}"),
        }
    }

    #[test]
    fn content_prompt_lists_context_and_extra_instructions() {
        let prompt = content_prompt(&bundle(), &[], Some("Mention the car wash"));
        assert!(prompt.contains("Brand: Acme Fuel"));
        assert!(prompt.contains("Location: Downtown (Store #042)"));
        assert!(prompt.contains("- discount: 20%"));
        assert!(prompt.contains("- has_drive_thru: true"));
        assert!(prompt.ends_with("Additional instructions: Mention the car wash"));
        assert!(!prompt.contains("Similar campaigns"));
    }

    #[test]
    fn content_prompt_includes_numbered_examples() {
        let examples = vec![RagExample {
            campaign_id: "c9".into(),
            brand_name: "Acme Fuel".into(),
            location_name: "Uptown".into(),
            content: "Fill up and save!".into(),
            similarity: 0.91,
        }];
        let prompt = content_prompt(&bundle(), &examples, None);
        assert!(prompt.contains("Example 1 (Acme Fuel - Uptown):\nFill up and save!"));
        assert!(prompt.contains("5. Match the tone"));
    }

    #[test]
    fn empty_maps_render_as_none_specified() {
        let mut b = bundle();
        b.campaign.customizations.clear();
        let prompt = content_prompt(&b, &[], None);
        assert!(prompt.contains("Campaign customizations:\nNone specified"));
    }

    #[test]
    fn html_prompt_names_placeholders_and_style() {
        let prompt = html_email_prompt(&bundle(), "Great deals");
        assert!(prompt.contains("{{recipient_name}}"));
        assert!(prompt.contains("{{unsubscribe_link}}"));
        assert!(prompt.contains("Offer details: discount: 20%"));
        assert!(prompt.contains("festive"));
    }

    #[test]
    fn subject_prompt_truncates_content() {
        let long = "x".repeat(2000);
        let prompt = subject_prompt(&bundle(), &long);
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(prompt.contains(&"x".repeat(500)));
    }
}
