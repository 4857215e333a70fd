//! Google Finance provider
//!
//! There is no public Google Finance API; this provider scrapes the quote
//! page. Prices are real; the technical snapshot is a coarse approximation
//! derived from the scraped price, with the advanced indicator fields absent.

use crate::error::{MarketError, Result};
use crate::model::{Currency, NewsItem, PriceSnapshot, TechnicalSnapshot, Trend};
use crate::providers::MarketDataProvider;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

const BASE_URL: &str = "https://www.google.com/finance";
const USER_AGENT: &str = "Mozilla/5.0";

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']price["']:\s*["']?([\d.]+)["']?"#).expect("valid price regex")
});
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']currency["']:\s*["']?([A-Za-z]{3})["']?"#).expect("valid currency regex")
});

/// Exchange-suffix to Google symbol-prefix mapping
const EXCHANGE_PREFIXES: &[(&str, &str)] = &[
    (".L", "LON:"),
    (".TO", "TSE:"),
    (".DE", "ETR:"),
    (".PA", "EPA:"),
    (".HK", "HKG:"),
    (".T", "TYO:"),
];

/// Google Finance data source
pub struct GoogleFinanceProvider {
    client: Client,
    base_url: String,
}

impl GoogleFinanceProvider {
    /// Create a provider with the default endpoint
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Create a provider against a custom endpoint (used in tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Map an exchange-suffixed ticker to Google's prefixed symbol
    fn exchange_symbol(ticker: &str) -> String {
        for (suffix, prefix) in EXCHANGE_PREFIXES {
            if let Some(base) = ticker.strip_suffix(suffix) {
                return format!("{prefix}{base}");
            }
        }
        ticker.to_string()
    }

    /// Extract price and currency from the quote page markup
    fn parse_quote(html: &str) -> Option<(f64, String)> {
        let price = PRICE_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())?;

        let currency = CURRENCY_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map_or_else(|| "USD".to_string(), |m| m.as_str().to_string());

        Some((price, currency))
    }
}

impl Default for GoogleFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for GoogleFinanceProvider {
    fn name(&self) -> &'static str {
        "google-finance"
    }

    async fn is_available(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn price(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
        let symbol = Self::exchange_symbol(ticker);
        let url = format!("{}/quote/{symbol}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(MarketError::NetworkError)?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let html = response.text().await.map_err(MarketError::NetworkError)?;
        let Some((raw_price, raw_currency)) = Self::parse_quote(&html) else {
            return Ok(None);
        };

        let currency = Currency::from_source(&raw_currency);
        Ok(Some(PriceSnapshot {
            ticker: ticker.to_string(),
            price: currency.normalize(raw_price),
            currency: currency.code,
            timestamp: Utc::now(),
            change_pct: None,
        }))
    }

    async fn technicals(&self, ticker: &str) -> Result<Option<TechnicalSnapshot>> {
        let Some(price) = self.price(ticker).await? else {
            return Ok(None);
        };

        Ok(Some(derive_snapshot(&price)))
    }

    async fn news(&self, _ticker: &str, _limit: usize) -> Result<Vec<NewsItem>> {
        Ok(Vec::new())
    }
}

/// Derive a coarse technical snapshot from a live price
///
/// No history endpoint exists to feed the indicator engine, so moving
/// averages and support/resistance are fixed offsets around the price and
/// the advanced indicator fields stay absent.
fn derive_snapshot(price: &PriceSnapshot) -> TechnicalSnapshot {
    let current = price.price;
    let sma20 = current * 0.98;
    let sma50 = current * 0.95;
    let trend = if current > sma50 {
        Trend::Bullish
    } else {
        Trend::Bearish
    };

    let currency = Currency::from_source(&price.currency);

    TechnicalSnapshot {
        ticker: price.ticker.clone(),
        current,
        sma20,
        sma50,
        rsi: 50.0,
        trend,
        support: current * 0.95,
        resistance: current * 1.05,
        currency: currency.code,
        symbol: currency.symbol,
        macd_line: None,
        macd_signal: None,
        macd_histogram: None,
        bb_upper: None,
        bb_middle: None,
        bb_lower: None,
        bb_width: None,
        volume: None,
        volume_sma20: None,
        atr: None,
        stoch_rsi: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_symbol_mapping() {
        assert_eq!(GoogleFinanceProvider::exchange_symbol("LLOY.L"), "LON:LLOY");
        assert_eq!(GoogleFinanceProvider::exchange_symbol("SHOP.TO"), "TSE:SHOP");
        assert_eq!(GoogleFinanceProvider::exchange_symbol("7203.T"), "TYO:7203");
        assert_eq!(GoogleFinanceProvider::exchange_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn test_parse_quote_markup() {
        let html = r#"{"price": "254.63", "currency": "USD", "other": 1}"#;
        let (price, currency) = GoogleFinanceProvider::parse_quote(html).unwrap();
        assert!((price - 254.63).abs() < 1e-9);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn test_parse_quote_defaults_currency() {
        let html = r#"{"price": 42.5}"#;
        let (price, currency) = GoogleFinanceProvider::parse_quote(html).unwrap();
        assert!((price - 42.5).abs() < 1e-9);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn test_parse_quote_missing_price() {
        assert!(GoogleFinanceProvider::parse_quote("<html>nothing here</html>").is_none());
    }

    #[test]
    fn test_derived_snapshot_approximation() {
        let price = PriceSnapshot {
            ticker: "LLOY.L".to_string(),
            price: 54.32,
            currency: "GBP".to_string(),
            timestamp: Utc::now(),
            change_pct: None,
        };

        let snapshot = derive_snapshot(&price);
        assert!((snapshot.sma20 - 54.32 * 0.98).abs() < 1e-9);
        assert!((snapshot.sma50 - 54.32 * 0.95).abs() < 1e-9);
        assert!((snapshot.rsi - 50.0).abs() < 1e-9);
        // Price always sits above the derived SMA50 offset
        assert_eq!(snapshot.trend, Trend::Bullish);
        assert_eq!(snapshot.symbol, "£");
        assert!(snapshot.macd_line.is_none());
        assert!(snapshot.atr.is_none());
    }
}
