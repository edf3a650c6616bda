use serde::{Deserialize, Serialize};

/// One failed delivery inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub email: String,
    pub error: String,
}

/// Aggregate outcome of a batch send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// Capped list of failures.
    pub errors: Vec<DeliveryFailure>,
}

/// Outcome of a bulk recipient import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientImport {
    pub created: usize,
    pub skipped: usize,
}

/// Per-status recipient counts for a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStats {
    pub total: usize,
    pub pending: usize,
    pub sent: usize,
    pub failed: usize,
}
