//! Gathers KB excerpts, quotes and news for a request and builds its citations

use std::sync::Arc;
use std::time::Duration;

use crate::config::FinRagConfig;
use crate::error::Result;
use crate::intent::IntentFlags;
use crate::providers::{NewsProvider, QuoteProvider};
use crate::retrieval::{ScoredMatch, VectorSearchEngine};
use crate::types::{AssembledContext, Citation, SourceKind};

use super::fanout::{best_effort, time_boxed};

/// Aggregator tuning, usually derived from `FinRagConfig`
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub top_k: usize,
    pub kb_snippet_chars: usize,
    pub default_watchlist: Vec<String>,
    pub default_news_symbol: String,
    pub news_headlines: usize,
    pub news_detail_chars: usize,
    pub source_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from_config(&FinRagConfig::default())
    }
}

impl AggregatorSettings {
    pub fn from_config(config: &FinRagConfig) -> Self {
        Self {
            top_k: config.search.top_k,
            kb_snippet_chars: config.search.kb_snippet_chars,
            default_watchlist: config.market.default_watchlist.clone(),
            default_news_symbol: config.market.default_news_symbol.clone(),
            news_headlines: config.orchestrator.news_headlines,
            news_detail_chars: config.orchestrator.news_detail_chars,
            source_timeout: config.orchestrator.source_timeout(),
        }
    }
}

/// Fans out to the sources requested by an intent and merges what comes back
pub struct SourceAggregator {
    search: Arc<VectorSearchEngine>,
    quotes: Arc<dyn QuoteProvider>,
    news: Arc<dyn NewsProvider>,
    settings: AggregatorSettings,
}

impl SourceAggregator {
    pub fn new(
        search: Arc<VectorSearchEngine>,
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            search,
            quotes,
            news,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Gather with the configured per-source timeout
    pub async fn gather(
        &self,
        intent: IntentFlags,
        ticker: Option<&str>,
        user_message: &str,
    ) -> Result<(AssembledContext, Vec<Citation>)> {
        self.gather_within(intent, ticker, user_message, self.settings.source_timeout)
            .await
    }

    /// Run the requested fetches concurrently, each time-boxed by `limit`.
    ///
    /// Source failures only remove that source's contribution. The single
    /// exception is a missing or corrupt corpus when the KB is the only
    /// requested source, which is returned as an error.
    pub async fn gather_within(
        &self,
        intent: IntentFlags,
        ticker: Option<&str>,
        user_message: &str,
        limit: Duration,
    ) -> Result<(AssembledContext, Vec<Citation>)> {
        let quote_symbols = match ticker {
            Some(ticker) => vec![ticker.to_string()],
            None => self.settings.default_watchlist.clone(),
        };
        let news_symbol = ticker.unwrap_or(&self.settings.default_news_symbol);

        let kb = async {
            if !intent.needs_definition {
                return Ok(None);
            }
            match time_boxed("kb", limit, self.search.search(user_message, self.settings.top_k)).await {
                Ok(matches) => Ok(Some(matches)),
                Err(e) if e.is_corpus_unavailable() && intent.is_kb_only() => Err(e),
                Err(e) => {
                    tracing::warn!(source = "kb", error = %e, "Error retrieving KB, continuing without it");
                    Ok(None)
                }
            }
        };

        let quotes = async {
            if !intent.needs_quotes {
                return None;
            }
            best_effort("quotes", limit, self.quotes.get_quotes(&quote_symbols)).await
        };

        let news = async {
            if !intent.needs_news {
                return None;
            }
            best_effort("news", limit, self.news.get_news(news_symbol)).await
        };

        let (kb, quotes, news) = tokio::join!(kb, quotes, news);
        let kb = kb?;

        let mut context = AssembledContext::default();
        let mut citations = Vec::new();

        if let Some(matches) = kb {
            self.add_kb(&matches, &mut context, &mut citations);
        }

        if let Some(quotes) = quotes.filter(|q| !q.is_empty()) {
            let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
            let detail = symbols.join(", ");
            tracing::info!("Fetched quotes for: {}", detail);
            citations.push(Citation::new(SourceKind::Quotes, detail));
            context.quotes = Some(quotes);
        }

        if let Some(articles) = news.filter(|a| !a.is_empty()) {
            let headlines: Vec<&str> = articles
                .iter()
                .take(self.settings.news_headlines)
                .map(|a| a.title.as_str())
                .collect();
            let detail = truncate_chars(&headlines.join("; "), self.settings.news_detail_chars);
            tracing::info!("Fetched {} news articles", articles.len());
            citations.push(Citation::new(SourceKind::News, detail));
            context.news = Some(articles);
        }

        Ok((context, citations))
    }

    fn add_kb(&self, matches: &[ScoredMatch], context: &mut AssembledContext, citations: &mut Vec<Citation>) {
        for m in matches {
            citations.push(Citation::new(SourceKind::Kb, document_key(&m.document_id)));
            context
                .kb_snippets
                .push(truncate_chars(&m.text, self.settings.kb_snippet_chars));
        }
        tracing::info!("Retrieved {} KB snippets", matches.len());
    }
}

/// Document id without its file extension
fn document_key(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => id,
    }
}

/// First `max` characters of `text`
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
