//! DuckDuckGo news provider
//!
//! Searches the DuckDuckGo HTML endpoint and turns results into headlines
//! with keyword-derived sentiment. London-listed tickers (`.L`) search for
//! RNS announcements instead of generic stock news. Results that mention
//! neither the base symbol nor a finance term are filtered out.

use crate::cache::{CacheKey, MarketCache};
use crate::config::QuorumConfig;
use crate::error::{MarketError, Result};
use crate::model::{NewsItem, PriceSnapshot, Sentiment, TechnicalSnapshot};
use crate::providers::MarketDataProvider;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0";
const TITLE_MAX_CHARS: usize = 60;

const BULLISH_WORDS: &[&str] = &["beat", "upgrade", "growth", "gain", "rise", "profit"];
const BEARISH_WORDS: &[&str] = &["miss", "downgrade", "warning", "loss", "fall", "debt"];
const FINANCE_WORDS: &[&str] = &["stock", "share", "market", "trading", "rns", "earnings"];

static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("valid result regex")
});
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</a>"#).expect("valid snippet regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// DuckDuckGo news search source
///
/// News only; the price and technicals capabilities report typed absence.
pub struct DuckDuckGoNewsProvider {
    client: Client,
    cache: MarketCache,
    search_url: String,
}

impl DuckDuckGoNewsProvider {
    /// Create a provider using the configured news cache TTL
    pub fn new(config: &QuorumConfig) -> Self {
        Self::with_search_url(config, SEARCH_URL)
    }

    /// Create a provider against a custom endpoint (used in tests)
    pub fn with_search_url(config: &QuorumConfig, search_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            cache: MarketCache::new(config.cache_ttl_news),
            search_url: search_url.into(),
        }
    }

    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(MarketError::NetworkError)?;

        if !response.status().is_success() {
            return Err(MarketError::ApiError(format!(
                "DuckDuckGo search returned HTTP {}",
                response.status()
            )));
        }

        response.text().await.map_err(MarketError::NetworkError)
    }
}

/// Build the search query for a ticker
fn search_query(ticker: &str) -> String {
    if ticker.ends_with(".L") {
        format!("{ticker} RNS")
    } else {
        format!("{ticker} stock news")
    }
}

/// Parse search result markup into headlines for the given ticker
fn parse_results(ticker: &str, html: &str, limit: usize) -> Vec<NewsItem> {
    let snippets: Vec<String> = SNIPPET_RE
        .captures_iter(html)
        .map(|c| clean_fragment(&c[1]))
        .collect();

    let base_symbol = ticker
        .split('.')
        .next()
        .unwrap_or(ticker)
        .to_lowercase();

    let mut items = Vec::new();
    for (index, capture) in RESULT_RE.captures_iter(html).enumerate() {
        if items.len() >= limit {
            break;
        }

        let url = resolve_redirect(&capture[1]);
        let title = clean_fragment(&capture[2]);
        let snippet = snippets.get(index).cloned().unwrap_or_default();

        if !is_relevant(&base_symbol, &title, &snippet) {
            continue;
        }

        let sentiment = analyze_sentiment(&format!("{title} {snippet}"));
        items.push(NewsItem {
            title: clip_chars(&title, TITLE_MAX_CHARS),
            source: host_of(&url),
            date: Utc::now().date_naive(),
            url,
            sentiment,
        });
    }
    items
}

/// Keyword relevance filter: keep results that mention the base symbol or a
/// finance term
fn is_relevant(base_symbol: &str, title: &str, snippet: &str) -> bool {
    let text = format!("{title} {snippet}").to_lowercase();
    text.contains(base_symbol) || FINANCE_WORDS.iter().any(|w| text.contains(w))
}

/// Keyword sentiment scoring; ties are neutral
fn analyze_sentiment(text: &str) -> Sentiment {
    let text = text.to_lowercase();
    let bullish = BULLISH_WORDS.iter().filter(|w| text.contains(**w)).count();
    let bearish = BEARISH_WORDS.iter().filter(|w| text.contains(**w)).count();

    if bullish > bearish {
        Sentiment::Bullish
    } else if bearish > bullish {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Unwrap DuckDuckGo's redirect links to the target URL
fn resolve_redirect(href: &str) -> String {
    if let Some(start) = href.find("uddg=") {
        let encoded = &href[start + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }

    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_string()
}

/// Strip tags and decode the entities that show up in result markup
fn clean_fragment(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, "");
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_string()
}

/// Truncate on a char boundary
fn clip_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Host portion of a URL, for display as the source
fn host_of(url: &str) -> String {
    url.split('/')
        .nth(2)
        .filter(|host| !host.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

#[async_trait]
impl MarketDataProvider for DuckDuckGoNewsProvider {
    fn name(&self) -> &'static str {
        "duckduckgo-news"
    }

    async fn is_available(&self) -> bool {
        match self.client.get(&self.search_url).query(&[("q", "test")]).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn price(&self, _ticker: &str) -> Result<Option<PriceSnapshot>> {
        Ok(None)
    }

    async fn technicals(&self, _ticker: &str) -> Result<Option<TechnicalSnapshot>> {
        Ok(None)
    }

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let query = search_query(ticker);
        let key = CacheKey::new(ticker, "news", serde_json::json!({ "limit": limit }));

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let html = self.search(&query).await?;
                let items = parse_results(ticker, &html, limit);
                serde_json::to_value(items).map_err(MarketError::from)
            })
            .await?;

        serde_json::from_value(value).map_err(Into::into)
    }
}
