//! Built-in market data served when live sources are unreachable

use chrono::{Duration, Utc};

use crate::types::{NewsArticle, Quote};

/// (symbol, price, change percent)
const SAMPLE_QUOTES: &[(&str, f64, f64)] = &[
    ("AAPL", 195.89, 1.23),
    ("MSFT", 378.85, -0.45),
    ("NVDA", 875.50, 2.15),
    ("TSLA", 248.42, -1.87),
    ("AMZN", 151.94, 0.78),
    ("SPY", 476.50, 0.34),
    ("QQQ", 412.30, 0.56),
];

/// (symbol, title, source, url, hours ago)
const SAMPLE_NEWS: &[(&str, &str, &str, &str, i64)] = &[
    ("AAPL", "Apple Reports Strong Q4 Earnings", "TechCrunch", "https://techcrunch.com/apple-earnings", 2),
    ("AAPL", "Apple Stock Rises on iPhone Sales", "Bloomberg", "https://bloomberg.com/apple-stock", 5),
    ("AAPL", "Apple Announces New Product Line", "Reuters", "https://reuters.com/apple-products", 8),
    ("MSFT", "Microsoft Cloud Revenue Surges", "The Verge", "https://theverge.com/microsoft-cloud", 1),
    ("MSFT", "Microsoft Teams Reaches 300M Users", "CNBC", "https://cnbc.com/microsoft-teams", 4),
    ("NVDA", "NVIDIA AI Chips in High Demand", "WSJ", "https://wsj.com/nvidia-ai", 3),
    ("NVDA", "NVIDIA Stock Hits New High", "MarketWatch", "https://marketwatch.com/nvidia-stock", 6),
    ("TSLA", "Tesla Deliveries Exceed Expectations", "Reuters", "https://reuters.com/tesla-deliveries", 2),
    ("AMZN", "Amazon AWS Growth Continues", "TechCrunch", "https://techcrunch.com/amazon-aws", 1),
    ("SPY", "S&P 500 Reaches Record High", "Bloomberg", "https://bloomberg.com/sp500", 2),
    ("QQQ", "NASDAQ ETF Shows Strong Performance", "CNBC", "https://cnbc.com/nasdaq-etf", 3),
];

pub fn sample_quote(symbol: &str) -> Option<Quote> {
    SAMPLE_QUOTES
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(s, price, change)| Quote::new(*s, *price, *change))
}

/// Sample quotes for the known symbols among `symbols`, in request order
pub fn sample_quotes(symbols: &[String]) -> Vec<Quote> {
    symbols.iter().filter_map(|s| sample_quote(s)).collect()
}

/// Sample headlines for `symbol`, or a single placeholder for unknown symbols
pub fn sample_news(symbol: &str) -> Vec<NewsArticle> {
    let now = Utc::now();
    let known: Vec<NewsArticle> = SAMPLE_NEWS
        .iter()
        .filter(|(s, ..)| *s == symbol)
        .map(|(_, title, source, url, hours)| NewsArticle {
            title: title.to_string(),
            source: source.to_string(),
            published_at: (now - Duration::hours(*hours)).to_rfc3339(),
            url: url.to_string(),
        })
        .collect();

    if !known.is_empty() {
        return known;
    }

    vec![NewsArticle {
        title: format!("Latest news about {}", symbol),
        source: "Financial News".to_string(),
        published_at: now.to_rfc3339(),
        url: "#".to_string(),
    }]
}
