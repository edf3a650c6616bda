//! Placeholder substitution for outgoing mail.

use storesync_core::constants::{
    DEFAULT_RECIPIENT_NAME, RECIPIENT_NAME_PLACEHOLDER, UNSUBSCRIBE_LINK_PLACEHOLDER,
};

/// `{base}?email={email}&campaign={campaign_id}`.
pub fn unsubscribe_link(base: &str, email: &str, campaign_id: &str) -> String {
    format!("{base}?email={email}&campaign={campaign_id}")
}

/// Replace the recipient-name and unsubscribe placeholders in `content`.
/// A blank name becomes the generic salutation.
pub fn personalize(
    content: &str,
    recipient_name: &str,
    recipient_email: &str,
    campaign_id: &str,
    unsubscribe_base: &str,
) -> String {
    let name = match recipient_name.trim() {
        "" => DEFAULT_RECIPIENT_NAME,
        name => name,
    };
    content
        .replace(RECIPIENT_NAME_PLACEHOLDER, name)
        .replace(
            UNSUBSCRIBE_LINK_PLACEHOLDER,
            &unsubscribe_link(unsubscribe_base, recipient_email, campaign_id),
        )
}
