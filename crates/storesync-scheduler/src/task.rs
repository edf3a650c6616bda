//! Background task model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work the runner knows how to execute. Every variant names the campaign
/// it reloads and persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    GenerateContent {
        campaign_id: String,
        use_ai: bool,
        extra_instructions: Option<String>,
    },
    ComputeEmbedding {
        campaign_id: String,
    },
    GenerateEmail {
        campaign_id: String,
    },
    SendBatch {
        campaign_id: String,
        recipient_ids: Option<Vec<String>>,
    },
    SendTestEmail {
        campaign_id: String,
        email: String,
        name: String,
    },
    /// Fans out into one `GenerateContent` per campaign at submission.
    BulkGenerate {
        campaign_ids: Vec<String>,
        use_ai: bool,
    },
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GenerateContent { .. } => "generate_content",
            Self::ComputeEmbedding { .. } => "compute_embedding",
            Self::GenerateEmail { .. } => "generate_email",
            Self::SendBatch { .. } => "send_batch",
            Self::SendTestEmail { .. } => "send_test_email",
            Self::BulkGenerate { .. } => "bulk_generate",
        }
    }

    pub fn campaign_id(&self) -> Option<&str> {
        match self {
            Self::GenerateContent { campaign_id, .. }
            | Self::ComputeEmbedding { campaign_id }
            | Self::GenerateEmail { campaign_id }
            | Self::SendBatch { campaign_id, .. }
            | Self::SendTestEmail { campaign_id, .. } => Some(campaign_id),
            Self::BulkGenerate { .. } => None,
        }
    }

    /// Only AI-backed work is retried; re-running a send would duplicate mail.
    pub fn retries_enabled(&self) -> bool {
        matches!(
            self,
            Self::GenerateContent { .. } | Self::ComputeEmbedding { .. } | Self::GenerateEmail { .. }
        )
    }
}

/// Lifecycle of a submitted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running { attempt: u32 },
    Succeeded { summary: serde_json::Value },
    Failed { error: String, attempts: u32 },
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Registry entry for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub kind: String,
    pub campaign_id: Option<String>,
    pub status: TaskStatus,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
