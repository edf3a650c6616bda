//! Recipient list management.

use std::collections::HashSet;

use tracing::info;

use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{NewRecipient, RecipientImport, RecipientStats};

use crate::sender::EmailSender;

/// Trim and lowercase addresses, drop ones without `@`, and keep the first
/// occurrence of each address. Returns the rows plus the in-input duplicate count.
pub fn normalize_recipients(input: &[NewRecipient]) -> (Vec<NewRecipient>, usize) {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(input.len());
    let mut duplicates = 0;
    for r in input {
        let email = r.email.trim().to_lowercase();
        if !email.contains('@') {
            continue;
        }
        if !seen.insert(email.clone()) {
            duplicates += 1;
            continue;
        }
        rows.push(NewRecipient {
            email,
            name: r.name.trim().to_string(),
        });
    }
    (rows, duplicates)
}

impl EmailSender {
    /// Add recipients to a campaign. Addresses already on the campaign (or
    /// repeated in the input) are counted as skipped.
    pub fn add_recipients(
        &self,
        campaign_id: &str,
        recipients: &[NewRecipient],
    ) -> StoreSyncResult<RecipientImport> {
        self.ensure_campaign(campaign_id)?;
        let (rows, duplicates) = normalize_recipients(recipients);
        let created = self.recipients.insert_recipients(campaign_id, &rows)?;
        let import = RecipientImport {
            created,
            skipped: duplicates + (rows.len() - created),
        };
        info!(
            campaign_id,
            created = import.created,
            skipped = import.skipped,
            "recipients added"
        );
        Ok(import)
    }

    /// Remove recipients still pending; sent and failed rows stay as history.
    pub fn clear_recipients(&self, campaign_id: &str) -> StoreSyncResult<usize> {
        self.ensure_campaign(campaign_id)?;
        let removed = self.recipients.clear_pending_recipients(campaign_id)?;
        info!(campaign_id, removed, "pending recipients cleared");
        Ok(removed)
    }

    pub fn email_stats(&self, campaign_id: &str) -> StoreSyncResult<RecipientStats> {
        self.ensure_campaign(campaign_id)?;
        self.recipients.recipient_stats(campaign_id)
    }

    fn ensure_campaign(&self, campaign_id: &str) -> StoreSyncResult<()> {
        match self.campaigns.get_campaign(campaign_id)? {
            Some(_) => Ok(()),
            None => Err(StoreSyncError::not_found("campaign", campaign_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_filters_and_dedupes() {
        let input = vec![
            NewRecipient::new("  Ana@Example.com ", " Ana "),
            NewRecipient::new("ana@example.com", "Duplicate"),
            NewRecipient::new("not-an-address", "Nobody"),
            NewRecipient::new("", ""),
            NewRecipient::new("bo@example.com", ""),
        ];
        let (rows, duplicates) = normalize_recipients(&input);
        assert_eq!(duplicates, 1);
        assert_eq!(
            rows,
            vec![
                NewRecipient::new("ana@example.com", "Ana"),
                NewRecipient::new("bo@example.com", ""),
            ]
        );
    }
}
