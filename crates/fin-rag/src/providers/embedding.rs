//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI embeddings API (text-embedding-3-small)
///
/// Any failure, including a missing API key, is reported as
/// `Error::EmbeddingUnavailable`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
