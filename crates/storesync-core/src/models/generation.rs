use std::fmt;

use serde::{Deserialize, Serialize};

/// Why template rendering was used instead of AI generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    AiNotConfigured,
    AiGenerationFailed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiNotConfigured => "AI not configured",
            Self::AiGenerationFailed => "AI generation failed",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated content with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub content: String,
    pub used_ai: bool,
    /// `None` when AI succeeded or was not requested.
    pub fallback_reason: Option<FallbackReason>,
    /// Number of retrieved examples included in the prompt.
    pub rag_examples_used: usize,
}

/// Content plus its embedding, when one could be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWithEmbedding {
    pub generated: GeneratedContent,
    pub embedding: Option<Vec<f32>>,
}

/// HTML body, subject, and preview text for a campaign email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub html: String,
    pub subject: String,
    pub preview_text: String,
}

/// Result of static template validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateValidation {
    pub valid: bool,
    /// Sorted, deduplicated variable names referenced by the template.
    pub variables: Vec<String>,
    pub error: Option<String>,
}
