//! fin-rag: retrieval-augmented answers to finance questions
//!
//! A chat request is classified into information needs, the matching sources
//! (knowledge base search, live quotes, news) are gathered concurrently with
//! per-source failure isolation, and the results are assembled into a bounded
//! prompt plus a citation list before the final text-generation call.

pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod intent;
pub mod orchestrator;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod sources;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::FinRagConfig;
pub use error::{Error, Result};
pub use intent::{classify, IntentFlags};
pub use orchestrator::{ChatOrchestrator, Stage};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Citation, SourceKind};
