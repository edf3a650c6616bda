use crate::errors::StoreSyncResult;

/// Text-generation capability ("generate text given a prompt").
pub trait ITextCompleter: Send + Sync {
    /// Complete a chat-style prompt, returning the raw model text.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> StoreSyncResult<String>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// False for the "not configured" sentinel.
    fn is_configured(&self) -> bool;
}
