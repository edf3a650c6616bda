//! # storesync-email
//!
//! Campaign email delivery: placeholder personalization, per-recipient sends
//! with status tracking, rate-limited batches, and recipient list management.

pub mod personalize;
pub mod recipients;
pub mod sender;
pub mod smtp;
pub mod transport;

pub use personalize::{personalize, unsubscribe_link};
pub use recipients::normalize_recipients;
pub use sender::EmailSender;
pub use smtp::SmtpMailer;
pub use transport::{create_transport, LoggingTransport};
