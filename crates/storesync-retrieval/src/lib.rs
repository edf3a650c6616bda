//! # storesync-retrieval
//!
//! Nearest-neighbour search over campaign embeddings, the retrieval step
//! behind AI generation, and embedding backfill.

pub mod backfill;
pub mod index;
pub mod rag;

pub use index::{content_preview, SimilarityIndex};
pub use rag::rag_query_text;
