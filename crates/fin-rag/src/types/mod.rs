//! Core types for the finance RAG engine

pub mod chat;
pub mod context;
pub mod market;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Citation, Role, SourceKind};
pub use context::AssembledContext;
pub use market::{normalize_symbols, NewsArticle, NewsResponse, Quote, QuotesResponse};
