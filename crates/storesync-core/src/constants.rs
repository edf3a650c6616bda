/// StoreSync system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding dimensionality (text-embedding-3-small).
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Maximum characters kept from a campaign's content in similarity previews.
pub const CONTENT_PREVIEW_CHARS: usize = 200;

/// Maximum characters of a delivery error persisted on a recipient.
pub const MAX_RECIPIENT_ERROR_CHARS: usize = 500;

/// Maximum characters of content handed to the subject-line prompt.
pub const SUBJECT_PROMPT_CONTENT_CHARS: usize = 500;

/// Maximum subject line length.
pub const MAX_SUBJECT_CHARS: usize = 60;

/// Maximum preview text length.
pub const MAX_PREVIEW_CHARS: usize = 100;

/// Display name substituted when a recipient has none.
pub const DEFAULT_RECIPIENT_NAME: &str = "Valued Customer";

/// Placeholder replaced with the recipient's display name.
pub const RECIPIENT_NAME_PLACEHOLDER: &str = "{{recipient_name}}";

/// Placeholder replaced with the per-recipient unsubscribe link.
pub const UNSUBSCRIBE_LINK_PLACEHOLDER: &str = "{{unsubscribe_link}}";

/// Actor recorded on transitions triggered by periodic sweeps.
pub const SYSTEM_ACTOR: &str = "system";

/// Maximum number of ids accepted by a single bulk operation.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;
