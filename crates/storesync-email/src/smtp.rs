//! SMTP delivery through a relay.

use std::time::Duration;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use storesync_core::config::{SmtpConfig, SmtpSecurity};
use storesync_core::errors::{StoreSyncResult, TransportError};
use storesync_core::traits::{IMailTransport, OutboundEmail};

/// Delivers each message over SMTP as a text/HTML alternative.
///
/// Connections are opened lazily and pooled, so constructing one never
/// touches the network.
pub struct SmtpMailer {
    mailer: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> StoreSyncResult<Self> {
        let unavailable = |reason: String| TransportError::Unavailable {
            transport: "smtp".to_string(),
            reason,
        };
        let builder = match config.security {
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&config.host)
                .map_err(|e| unavailable(e.to_string()))?,
            SmtpSecurity::Tls => {
                SmtpTransport::relay(&config.host).map_err(|e| unavailable(e.to_string()))?
            }
            SmtpSecurity::None => SmtpTransport::builder_dangerous(&config.host),
        };
        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        Ok(Self {
            mailer: builder.build(),
            host: config.host.clone(),
        })
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

/// Build the MIME message for one recipient.
pub fn build_message(email: &OutboundEmail) -> StoreSyncResult<Message> {
    let failed = |reason: String| TransportError::DeliveryFailed {
        recipient: email.to.clone(),
        reason,
    };
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| failed(format!("invalid sender address: {e}")))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| failed(format!("invalid recipient address: {e}")))?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| failed(e.to_string()))?;
    Ok(message)
}

impl IMailTransport for SmtpMailer {
    fn send(&self, email: &OutboundEmail) -> StoreSyncResult<()> {
        let message = build_message(email)?;
        self.mailer
            .send(&message)
            .map_err(|e| TransportError::DeliveryFailed {
                recipient: email.to.clone(),
                reason: e.to_string(),
            })?;
        debug!(host = %self.host, to = %email.to, "email delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storesync_core::errors::StoreSyncError;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            from: "StoreSync <noreply@storesync.com>".into(),
            to: to.into(),
            subject: "Spring deals".into(),
            text: "Deals inside".into(),
            html: "<p>Deals inside</p>".into(),
        }
    }

    fn local_relay(port: u16) -> SmtpConfig {
        SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            security: SmtpSecurity::None,
            timeout_secs: 2,
            ..SmtpConfig::default()
        }
    }

    #[test]
    fn message_carries_both_bodies() {
        let message = build_message(&email("pat@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Spring deals"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Deals inside"));
        assert!(raw.contains("<p>Deals inside</p>"));
        assert_eq!(message.envelope().to().len(), 1);
    }

    #[test]
    fn bad_recipient_is_delivery_failure() {
        let err = build_message(&email("not an address")).unwrap_err();
        match err {
            StoreSyncError::TransportError(TransportError::DeliveryFailed { recipient, .. }) => {
                assert_eq!(recipient, "not an address")
            }
            other => panic!("expected delivery failure, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_relay_is_delivery_failure() {
        let mailer = SmtpMailer::from_config(&local_relay(9)).unwrap();
        assert_eq!(mailer.name(), "smtp");
        let err = mailer.send(&email("pat@example.com")).unwrap_err();
        assert!(matches!(
            err,
            StoreSyncError::TransportError(TransportError::DeliveryFailed { .. })
        ));
    }
}
