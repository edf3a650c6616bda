use serde::{Deserialize, Serialize};

use crate::errors::StoreSyncResult;

/// A fully personalized message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound mail capability.
pub trait IMailTransport: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> StoreSyncResult<()>;

    fn name(&self) -> &str;
}
