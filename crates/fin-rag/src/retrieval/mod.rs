//! Semantic search over the knowledge base corpus

pub mod excerpt;
pub mod search;
pub mod similarity;

pub use excerpt::{excerpt, ELLIPSIS};
pub use search::{rank, ScoredMatch, VectorSearchEngine};
pub use similarity::cosine_similarity;
