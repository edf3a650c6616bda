//! Mail backend selection and the development backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

use storesync_core::config::{EmailConfig, MailTransportKind};
use storesync_core::errors::StoreSyncResult;
use storesync_core::traits::{IMailTransport, OutboundEmail};

use crate::smtp::SmtpMailer;

/// Build the transport named by `config.transport`.
pub fn create_transport(config: &EmailConfig) -> StoreSyncResult<Arc<dyn IMailTransport>> {
    match config.transport {
        MailTransportKind::Logging => {
            info!(transport = "logging", "mail is logged, not delivered");
            Ok(Arc::new(LoggingTransport::new()))
        }
        MailTransportKind::Smtp => {
            let mailer = SmtpMailer::from_config(&config.smtp)?;
            info!(
                transport = "smtp",
                host = %config.smtp.host,
                port = config.smtp.port,
                "mail transport configured"
            );
            Ok(Arc::new(mailer))
        }
    }
}

/// Logs each message instead of delivering it.
#[derive(Debug, Default)]
pub struct LoggingTransport {
    delivered: AtomicUsize,
}

impl LoggingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl IMailTransport for LoggingTransport {
    fn send(&self, email: &OutboundEmail) -> StoreSyncResult<()> {
        info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            html_bytes = email.html.len(),
            text_bytes = email.text.len(),
            "email (not delivered)"
        );
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
