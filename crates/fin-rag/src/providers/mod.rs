//! Provider abstractions for embeddings, text generation, quotes and news
//!
//! The engine only talks to these traits; the HTTP adapters live next to them
//! and tests substitute in-memory fakes.

pub mod embedding;
pub mod llm;
pub mod market;
pub mod mock;
pub mod news;
pub mod openai;
pub mod sample_data;
pub mod yahoo;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use market::{NewsProvider, QuoteProvider};
pub use mock::MockLlm;
pub use news::NewsFeed;
pub use openai::{OpenAiEmbedder, OpenAiLlm};
pub use yahoo::YahooQuotes;
