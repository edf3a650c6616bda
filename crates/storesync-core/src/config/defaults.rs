//! Compiled defaults for every configuration section.

// Storage
pub const DEFAULT_DB_PATH: &str = "storesync.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// AI
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_HTML_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_AI_MAX_RETRIES: u32 = 2;
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;

// Generation
pub const DEFAULT_RAG_ENABLED: bool = true;
pub const DEFAULT_RAG_MAX_EXAMPLES: usize = 3;
pub const DEFAULT_RAG_THRESHOLD: f64 = 0.6;

// Similarity
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SIMILARITY_LIMIT: usize = 10;

// Scheduler
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_TASK_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TASK_RETRY_DELAY_SECS: u64 = 60;
pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 86_400;
pub const DEFAULT_APPROVAL_RETENTION_DAYS: i64 = 365;

// Email
pub const DEFAULT_FROM_ADDRESS: &str = "StoreSync <noreply@storesync.com>";
pub const DEFAULT_UNSUBSCRIBE_BASE: &str = "#unsubscribe";
pub const DEFAULT_RATE_LIMIT_EVERY: usize = 5;
pub const DEFAULT_RATE_LIMIT_PAUSE_MS: u64 = 1000;
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 50;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_PASSWORD_ENV: &str = "STORESYNC_SMTP_PASSWORD";
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

// Observability
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_LOG_JSON: bool = true;
