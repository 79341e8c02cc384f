//! News headlines from NewsAPI and Finnhub, with built-in fallbacks

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::MarketConfig;
use crate::error::{Error, Result};
use crate::types::NewsArticle;

use super::market::NewsProvider;
use super::sample_data::sample_news;

/// Headlines kept from any one source
pub const MAX_NEWS_ITEMS: usize = 10;

const FINNHUB_LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    source: Option<NewsApiSource>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinnhubItem {
    headline: Option<String>,
    source: Option<String>,
    url: Option<String>,
    datetime: Option<i64>,
}

fn from_newsapi(response: NewsApiResponse) -> Vec<NewsArticle> {
    response
        .articles
        .into_iter()
        .take(MAX_NEWS_ITEMS)
        .map(|a| NewsArticle {
            title: a.title.unwrap_or_else(|| "No title".to_string()),
            source: a.source.and_then(|s| s.name).unwrap_or_else(|| "Unknown".to_string()),
            url: a.url.unwrap_or_else(|| "#".to_string()),
            published_at: a.published_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
        })
        .collect()
}

fn from_finnhub(items: Vec<FinnhubItem>) -> Vec<NewsArticle> {
    items
        .into_iter()
        .take(MAX_NEWS_ITEMS)
        .map(|item| NewsArticle {
            title: item.headline.unwrap_or_else(|| "No title".to_string()),
            source: item.source.unwrap_or_else(|| "Unknown".to_string()),
            url: item.url.unwrap_or_else(|| "#".to_string()),
            published_at: item
                .datetime
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .unwrap_or_else(Utc::now)
                .to_rfc3339(),
        })
        .collect()
}

/// Tries NewsAPI, then Finnhub, then the sample headlines
pub struct NewsFeed {
    client: Client,
    news_api_base_url: String,
    finnhub_base_url: String,
    news_api_key: Option<String>,
    finnhub_api_key: Option<String>,
    mock_fallback: bool,
    timeout: Duration,
}

impl NewsFeed {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            news_api_base_url: config.news_api_base_url.trim_end_matches('/').to_string(),
            finnhub_base_url: config.finnhub_base_url.trim_end_matches('/').to_string(),
            news_api_key: config.news_api_key.clone(),
            finnhub_api_key: config.finnhub_api_key.clone(),
            mock_fallback: config.mock_fallback,
            timeout: Duration::from_secs(config.http_timeout_secs),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::source_fetch("news", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::source_fetch("news", format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| Error::source_fetch("news", format!("bad payload: {}", e)))
    }

    async fn fetch_newsapi(&self, symbol: &str, key: &str) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/v2/everything", self.news_api_base_url);
        let query = [
            ("q", symbol.to_string()),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", MAX_NEWS_ITEMS.to_string()),
            ("apiKey", key.to_string()),
        ];
        let response: NewsApiResponse = self.get_json(&url, &query).await?;
        Ok(from_newsapi(response))
    }

    async fn fetch_finnhub(&self, symbol: &str, key: &str) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/api/v1/company-news", self.finnhub_base_url);
        let today = Utc::now().date_naive();
        let from = today - ChronoDuration::days(FINNHUB_LOOKBACK_DAYS);
        let query = [
            ("symbol", symbol.to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", today.format("%Y-%m-%d").to_string()),
            ("token", key.to_string()),
        ];
        let items: Vec<FinnhubItem> = self.get_json(&url, &query).await?;
        Ok(from_finnhub(items))
    }
}

#[async_trait]
impl NewsProvider for NewsFeed {
    async fn get_news(&self, symbol: &str) -> Result<Vec<NewsArticle>> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(Error::invalid_request("Missing ticker parameter"));
        }

        if let Some(key) = &self.news_api_key {
            match self.fetch_newsapi(&symbol, key).await {
                Ok(items) if !items.is_empty() => return Ok(items),
                Ok(_) => tracing::debug!("NewsAPI returned no articles for {}", symbol),
                Err(e) => tracing::warn!("NewsAPI failed, trying Finnhub: {}", e),
            }
        }

        if let Some(key) = &self.finnhub_api_key {
            match self.fetch_finnhub(&symbol, key).await {
                Ok(items) if !items.is_empty() => return Ok(items),
                Ok(_) => tracing::debug!("Finnhub returned no articles for {}", symbol),
                Err(e) => tracing::warn!("Finnhub failed: {}", e),
            }
        }

        if self.mock_fallback {
            return Ok(sample_news(&symbol));
        }

        Err(Error::source_fetch("news", format!("no news available for {}", symbol)))
    }

    fn name(&self) -> &str {
        "newsfeed"
    }
}
