//! Per-request context gathered from the sources

use super::market::{NewsArticle, Quote};

/// Context merged from the knowledge base, quotes and news.
///
/// Built once per request by the source aggregator and consumed once by the
/// prompt builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledContext {
    /// Ranked KB snippets, already capped to the snippet budget
    pub kb_snippets: Vec<String>,
    /// Quotes snapshot, present only when at least one quote was returned
    pub quotes: Option<Vec<Quote>>,
    /// News snapshot, present only when at least one article was returned
    pub news: Option<Vec<NewsArticle>>,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.kb_snippets.is_empty() && self.quotes.is_none() && self.news.is_none()
    }
}
