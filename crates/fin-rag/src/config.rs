//! Configuration for the finance RAG engine

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FINRAG_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "finrag.toml";

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinRagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Corpus snapshot location
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Knowledge base search tuning
    #[serde(default)]
    pub search: SearchConfig,
    /// Embedding and text-generation service
    #[serde(default)]
    pub llm: LlmConfig,
    /// Quotes and news sources
    #[serde(default)]
    pub market: MarketConfig,
    /// Per-request pipeline limits
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl FinRagConfig {
    /// Load configuration.
    ///
    /// Resolution order: explicit `path`, then `$FINRAG_CONFIG`, then `./finrag.toml`
    /// if it exists, then built-in defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(&local)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Configuration(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = non_empty("NEWS_API_KEY") {
            self.market.news_api_key = Some(key);
        }
        if let Some(key) = non_empty("FINNHUB_API_KEY") {
            self.market.finnhub_api_key = Some(key);
        }
        if non_empty("USE_MOCK_CHAT").as_deref() == Some("true") {
            self.llm.backend = LlmBackend::Mock;
        }
        if let Some(host) = non_empty("FINRAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("FINRAG_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = non_empty("FINRAG_CORPUS_PATH") {
            self.corpus.snapshot_path = PathBuf::from(path);
        }
    }

    /// Structural checks that do not need network access
    pub fn validate(&self) -> Result<()> {
        if self.search.top_k == 0 {
            return Err(Error::Configuration("search.top_k must be at least 1".into()));
        }
        if self.search.excerpt_max_len == 0 {
            return Err(Error::Configuration("search.excerpt_max_len must be at least 1".into()));
        }
        if self.market.default_watchlist.is_empty() {
            return Err(Error::Configuration("market.default_watchlist must not be empty".into()));
        }

        if let Some(key) = &self.llm.api_key {
            if !key.starts_with("sk-") {
                tracing::warn!("API key format may be incorrect (expected sk- prefix)");
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// Corpus snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to the embeddings JSON snapshot
    pub snapshot_path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data").join("kb_embeddings.json"),
        }
    }
}

/// Knowledge base search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Matches retrieved per KB search
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Maximum excerpt length in characters (before the ellipsis marker)
    #[serde(default = "default_excerpt_max_len")]
    pub excerpt_max_len: usize,
    /// Characters of each matched document passed into the prompt
    #[serde(default = "default_kb_snippet_chars")]
    pub kb_snippet_chars: usize,
}

fn default_top_k() -> usize { 3 }
fn default_excerpt_max_len() -> usize { 200 }
fn default_kb_snippet_chars() -> usize { 500 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            excerpt_max_len: 200,
            kb_snippet_chars: 500,
        }
    }
}

/// Text-generation backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI-compatible HTTP API
    #[default]
    OpenAi,
    /// Canned answers, no network
    Mock,
}

/// Embedding + generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider
    #[serde(default)]
    pub backend: LlmBackend,
    /// API base URL
    pub base_url: String,
    /// API key (usually supplied through OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum completion tokens
    pub max_tokens: u32,
    /// Generation request timeout in seconds
    pub timeout_secs: u64,
    /// Embedding request timeout in seconds
    pub embed_timeout_secs: u64,
    /// Retries for transient generation failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            embed_model: "text-embedding-3-small".to_string(),
            generate_model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 20,
            embed_timeout_secs: 60,
            max_retries: 1,
        }
    }
}

/// Quotes and news source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Symbols quoted when the request carries no ticker
    pub default_watchlist: Vec<String>,
    /// Symbol used for news when the request carries no ticker
    pub default_news_symbol: String,
    /// Yahoo Finance chart API base URL
    pub yahoo_base_url: String,
    /// NewsAPI base URL
    pub news_api_base_url: String,
    /// Finnhub base URL
    pub finnhub_base_url: String,
    /// NewsAPI key
    #[serde(default)]
    pub news_api_key: Option<String>,
    /// Finnhub key
    #[serde(default)]
    pub finnhub_api_key: Option<String>,
    /// Serve built-in sample data when providers fail
    pub mock_fallback: bool,
    /// HTTP timeout for provider calls in seconds
    pub http_timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            default_watchlist: ["AAPL", "MSFT", "NVDA", "TSLA", "AMZN", "SPY", "QQQ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_news_symbol: "AAPL".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            news_api_base_url: "https://newsapi.org".to_string(),
            finnhub_base_url: "https://finnhub.io".to_string(),
            news_api_key: None,
            finnhub_api_key: None,
            mock_fallback: true,
            http_timeout_secs: 8,
        }
    }
}

/// Per-request pipeline limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Deadline for the whole pipeline in seconds
    pub request_deadline_secs: u64,
    /// Time box for each source fetch in seconds
    pub source_timeout_secs: u64,
    /// Most recent conversation turns forwarded to the model
    pub history_turns: usize,
    /// Characters kept from each forwarded turn
    pub history_chars: usize,
    /// Headlines listed in the prompt and the news citation
    pub news_headlines: usize,
    /// Character cap of the news citation detail
    pub news_detail_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: 30,
            source_timeout_secs: 10,
            history_turns: 10,
            history_chars: 2000,
            news_headlines: 3,
            news_detail_chars: 200,
        }
    }
}

impl OrchestratorConfig {
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FinRagConfig::default();
        assert_eq!(config.search.top_k, 3);
        assert_eq!(config.orchestrator.history_turns, 10);
        assert_eq!(config.orchestrator.history_chars, 2000);
        assert_eq!(config.market.default_watchlist.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FinRagConfig::from_toml(
            r#"
            [search]
            top_k = 5

            [corpus]
            snapshot_path = "/tmp/kb.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.top_k, 5);
        assert_eq!(config.search.excerpt_max_len, 200);
        assert_eq!(config.corpus.snapshot_path, PathBuf::from("/tmp/kb.json"));
        assert_eq!(config.llm.generate_model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "  sk-test  "),
            ("USE_MOCK_CHAT", "true"),
            ("FINRAG_PORT", "8088"),
            ("NEWS_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = FinRagConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.backend, LlmBackend::Mock);
        assert_eq!(config.server.port, 8088);
        assert!(config.market.news_api_key.is_none());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = FinRagConfig::default();
        config.search.top_k = 0;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }
}
