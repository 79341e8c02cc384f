//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::{FinRagConfig, LlmBackend};
use crate::corpus::CorpusStore;
use crate::error::Result;
use crate::generation::OpenAiClient;
use crate::orchestrator::ChatOrchestrator;
use crate::providers::{
    EmbeddingProvider, LlmProvider, MockLlm, NewsFeed, NewsProvider, OpenAiEmbedder, OpenAiLlm,
    QuoteProvider, YahooQuotes,
};
use crate::retrieval::VectorSearchEngine;
use crate::sources::{AggregatorSettings, SourceAggregator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: FinRagConfig,
    corpus: Arc<CorpusStore>,
    quotes: Arc<dyn QuoteProvider>,
    news: Arc<dyn NewsProvider>,
    orchestrator: ChatOrchestrator,
}

impl AppState {
    /// Wire the production providers from configuration
    pub fn new(config: FinRagConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(&config.llm)?);

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::from_client(Arc::clone(&client)));
        let llm: Arc<dyn LlmProvider> = match config.llm.backend {
            LlmBackend::OpenAi => Arc::new(OpenAiLlm::from_client(client)),
            LlmBackend::Mock => {
                tracing::info!("Mock chat mode enabled, no generation requests will be made");
                Arc::new(MockLlm::new())
            }
        };
        tracing::info!("Generation provider: {} ({})", llm.name(), llm.model());

        let corpus = Arc::new(CorpusStore::new(&config.corpus.snapshot_path));
        let quotes: Arc<dyn QuoteProvider> = Arc::new(YahooQuotes::new(&config.market)?);
        let news: Arc<dyn NewsProvider> = Arc::new(NewsFeed::new(&config.market)?);

        Ok(Self::from_parts(config, corpus, embedder, llm, quotes, news))
    }

    /// Assemble state from already-built providers
    pub fn from_parts(
        config: FinRagConfig,
        corpus: Arc<CorpusStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        let search = Arc::new(VectorSearchEngine::new(
            Arc::clone(&corpus),
            embedder,
            config.search.excerpt_max_len,
        ));
        let aggregator = Arc::new(SourceAggregator::new(
            search,
            Arc::clone(&quotes),
            Arc::clone(&news),
            AggregatorSettings::from_config(&config),
        ));
        let orchestrator = ChatOrchestrator::new(aggregator, llm, &config);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                corpus,
                quotes,
                news,
                orchestrator,
            }),
        }
    }

    pub fn config(&self) -> &FinRagConfig {
        &self.inner.config
    }

    pub fn corpus(&self) -> &Arc<CorpusStore> {
        &self.inner.corpus
    }

    pub fn quotes(&self) -> &Arc<dyn QuoteProvider> {
        &self.inner.quotes
    }

    pub fn news(&self) -> &Arc<dyn NewsProvider> {
        &self.inner.news
    }

    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.inner.orchestrator
    }
}
