//! Brute-force cosine search over the corpus snapshot

use std::sync::Arc;
use std::time::Instant;

use crate::corpus::{Corpus, CorpusStore};
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::excerpt::excerpt;
use super::similarity::cosine_similarity;

/// Search result with document and similarity
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Source filename of the document
    pub document_id: String,
    /// Full document text
    pub text: String,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// Shortened text for display
    pub excerpt: String,
}

/// Score every corpus document against `query_embedding` and keep the best `top_k`.
///
/// Sorting is stable, so equal scores keep corpus order.
pub fn rank(
    corpus: &Corpus,
    query_embedding: &[f32],
    top_k: usize,
    excerpt_max_len: usize,
) -> Result<Vec<ScoredMatch>> {
    let mut scored = Vec::with_capacity(corpus.len());
    for (index, doc) in corpus.documents().iter().enumerate() {
        scored.push((index, cosine_similarity(query_embedding, &doc.embedding)?));
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);

    Ok(scored
        .into_iter()
        .map(|(index, score)| {
            let doc = &corpus.documents()[index];
            ScoredMatch {
                document_id: doc.id.clone(),
                text: doc.text.clone(),
                score,
                excerpt: excerpt(&doc.text, excerpt_max_len),
            }
        })
        .collect())
}

/// Embeds queries and ranks the KB corpus against them
pub struct VectorSearchEngine {
    store: Arc<CorpusStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    excerpt_max_len: usize,
}

impl VectorSearchEngine {
    pub fn new(
        store: Arc<CorpusStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        excerpt_max_len: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            excerpt_max_len,
        }
    }

    pub fn store(&self) -> &Arc<CorpusStore> {
        &self.store
    }

    /// Return up to `top_k` matches for `query`, best first
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredMatch>> {
        if query.trim().is_empty() {
            return Err(Error::invalid_request("Search query must not be empty"));
        }
        if top_k == 0 {
            return Err(Error::invalid_request("top_k must be at least 1"));
        }

        let start = Instant::now();

        // CorpusStore::load does blocking file IO on first use
        let store = Arc::clone(&self.store);
        let corpus = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        if corpus.is_empty() {
            tracing::debug!("KB corpus is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        if query_embedding.len() != corpus.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: corpus.dimensions(),
                got: query_embedding.len(),
            });
        }

        let results = rank(&corpus, &query_embedding, top_k, self.excerpt_max_len)?;

        tracing::info!(
            "KB search for \"{}\" - Found {} results in {}ms",
            query,
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(results)
    }
}
