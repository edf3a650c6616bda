/// Similarity retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query text must not be empty")]
    EmptyQuery,

    #[error("similarity search failed: {reason}")]
    SearchFailed { reason: String },
}
