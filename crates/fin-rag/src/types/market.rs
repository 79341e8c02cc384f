//! Market data records returned by the quotes and news sources

use serde::{Deserialize, Serialize};

/// Price snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Percent change versus previous close
    pub change_pct: f64,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: f64, change_pct: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_pct,
        }
    }
}

/// News headline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    /// RFC 3339 timestamp
    pub published_at: String,
    pub url: String,
}

/// GET /api/quotes response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesResponse {
    pub as_of: String,
    pub quotes: Vec<Quote>,
}

/// GET /api/news response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponse {
    pub ticker: String,
    pub items: Vec<NewsArticle>,
}

/// Trim, uppercase and drop empty symbols
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
