/// Mail transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("delivery to {recipient} failed: {reason}")]
    DeliveryFailed { recipient: String, reason: String },

    #[error("mail transport {transport} unavailable: {reason}")]
    Unavailable { transport: String, reason: String },
}
