//! EmailSender: per-recipient delivery and rate-limited batches.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use storesync_observability::email_batch_span;

use storesync_core::config::EmailConfig;
use storesync_core::constants::MAX_RECIPIENT_ERROR_CHARS;
use storesync_core::errors::{StoreSyncError, StoreSyncResult};
use storesync_core::models::{
    BatchReport, CampaignBundle, CampaignStatus, DeliveryFailure, EmailRecipient, RecipientStatus,
};
use storesync_core::traits::{ICampaignStorage, IMailTransport, IRecipientStorage, OutboundEmail};

use crate::personalize::personalize;

const NO_HTML_ERROR: &str = "No HTML email content available";

pub struct EmailSender {
    pub(crate) campaigns: Arc<dyn ICampaignStorage>,
    pub(crate) recipients: Arc<dyn IRecipientStorage>,
    transport: Arc<dyn IMailTransport>,
    config: EmailConfig,
}

impl EmailSender {
    pub fn new(
        campaigns: Arc<dyn ICampaignStorage>,
        recipients: Arc<dyn IRecipientStorage>,
        transport: Arc<dyn IMailTransport>,
        config: EmailConfig,
    ) -> Self {
        Self {
            campaigns,
            recipients,
            transport,
            config,
        }
    }

    /// Deliver the campaign email to one recipient and record the outcome on
    /// the recipient row. Never fails: the return value says whether the
    /// message went out.
    pub fn send_campaign_email(&self, bundle: &CampaignBundle, recipient: &EmailRecipient) -> bool {
        self.deliver(bundle, recipient).is_ok()
    }

    /// Like `send_campaign_email`, but hands back the recorded error text.
    fn deliver(&self, bundle: &CampaignBundle, recipient: &EmailRecipient) -> Result<(), String> {
        let campaign_id = bundle.campaign.id.as_str();
        if !bundle.campaign.has_html_email() {
            error!(campaign_id, "campaign has no HTML email content");
            return Err(self.record_failure(recipient, NO_HTML_ERROR));
        }

        let email = self.compose(bundle, &recipient.email, &recipient.name);
        match self.transport.send(&email) {
            Ok(()) => {
                if let Err(e) = self.recipients.mark_recipient_sent(&recipient.id, Utc::now()) {
                    error!(recipient_id = %recipient.id, error = %e, "failed to record delivery");
                }
                info!(campaign_id, email = %recipient.email, "email sent");
                Ok(())
            }
            Err(e) => {
                warn!(campaign_id, email = %recipient.email, error = %e, "email delivery failed");
                Err(self.record_failure(recipient, &e.to_string()))
            }
        }
    }

    /// Send to the campaign's pending recipients, or to the pending members of
    /// `recipient_ids`. The campaign must be active with an HTML body.
    pub fn send_batch(
        &self,
        campaign_id: &str,
        recipient_ids: Option<&[String]>,
    ) -> StoreSyncResult<BatchReport> {
        let _span = email_batch_span!(campaign_id).entered();
        let bundle = self.bundle(campaign_id)?;
        if bundle.campaign.status != CampaignStatus::Active {
            return Err(StoreSyncError::precondition(format!(
                "emails can only be sent for active campaigns; {campaign_id} is {}",
                bundle.campaign.status
            )));
        }
        if !bundle.campaign.has_html_email() {
            return Err(StoreSyncError::precondition(format!(
                "campaign {campaign_id} has no HTML email content"
            )));
        }

        let targets: Vec<EmailRecipient> = match recipient_ids {
            Some(ids) => self
                .recipients
                .get_recipients(campaign_id, ids)?
                .into_iter()
                .filter(|r| r.status == RecipientStatus::Pending)
                .collect(),
            None => self
                .recipients
                .list_recipients(campaign_id, Some(RecipientStatus::Pending))?,
        };

        let pause = Duration::from_millis(self.config.rate_limit_pause_ms);
        let mut report = BatchReport::default();
        let mut window = 0;
        for (index, recipient) in targets.iter().enumerate() {
            report.total += 1;
            match self.deliver(&bundle, recipient) {
                Ok(()) => report.sent += 1,
                Err(error) => {
                    report.failed += 1;
                    if report.errors.len() < self.config.max_reported_errors {
                        report.errors.push(DeliveryFailure {
                            email: recipient.email.clone(),
                            error,
                        });
                    }
                }
            }

            window += 1;
            let more_to_send = index + 1 < targets.len();
            if self.config.rate_limit_every > 0 && window >= self.config.rate_limit_every {
                if more_to_send && !pause.is_zero() {
                    thread::sleep(pause);
                }
                window = 0;
            }
        }

        info!(
            campaign_id,
            total = report.total,
            sent = report.sent,
            failed = report.failed,
            "batch send complete"
        );
        Ok(report)
    }

    /// Send a preview of the campaign email to `email`. Recipient rows are
    /// not touched and transport errors are returned.
    pub fn send_test_email(&self, campaign_id: &str, email: &str, name: &str) -> StoreSyncResult<()> {
        let address = email.trim();
        if !address.contains('@') {
            return Err(StoreSyncError::validation(
                "email",
                format!("'{email}' is not an email address"),
            ));
        }
        let bundle = self.bundle(campaign_id)?;
        if !bundle.campaign.has_html_email() {
            return Err(StoreSyncError::precondition(format!(
                "campaign {campaign_id} has no HTML email content"
            )));
        }

        let message = self.compose(&bundle, address, name);
        self.transport.send(&message)?;
        info!(campaign_id, email = address, "test email sent");
        Ok(())
    }

    fn compose(&self, bundle: &CampaignBundle, to: &str, name: &str) -> OutboundEmail {
        let campaign = &bundle.campaign;
        let fill = |content: &str| {
            personalize(content, name, to, &campaign.id, &self.config.unsubscribe_base)
        };
        let text_source = if campaign.has_content() {
            campaign.generated_content.as_str()
        } else {
            campaign.email_subject.as_str()
        };
        let subject = if campaign.email_subject.trim().is_empty() {
            format!("Message from {}", bundle.location.name)
        } else {
            campaign.email_subject.clone()
        };

        OutboundEmail {
            from: self.config.from_address.clone(),
            to: to.to_string(),
            subject,
            text: fill(text_source),
            html: fill(&campaign.generated_html_email),
        }
    }

    fn record_failure(&self, recipient: &EmailRecipient, message: &str) -> String {
        let truncated: String = message.chars().take(MAX_RECIPIENT_ERROR_CHARS).collect();
        if let Err(e) = self.recipients.mark_recipient_failed(&recipient.id, &truncated) {
            error!(recipient_id = %recipient.id, error = %e, "failed to record delivery failure");
        }
        truncated
    }

    pub(crate) fn bundle(&self, campaign_id: &str) -> StoreSyncResult<CampaignBundle> {
        self.campaigns
            .load_bundle(campaign_id)?
            .ok_or_else(|| StoreSyncError::not_found("campaign", campaign_id))
    }
}
