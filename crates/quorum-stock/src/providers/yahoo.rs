//! Yahoo Finance provider

use crate::cache::{CacheKey, MarketCache};
use crate::config::QuorumConfig;
use crate::error::{MarketError, Result};
use crate::indicators::{self, MIN_BARS};
use crate::model::{Bar, Currency, NewsItem, PriceSnapshot, TechnicalSnapshot};
use crate::providers::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Daily history for one ticker, as fetched (pre-normalization)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct History {
    bars: Vec<Bar>,
    currency: String,
}

/// Yahoo Finance data source
///
/// Price and technicals come from the same cached daily history; technicals
/// delegate to the indicator engine. Yahoo has no usable news endpoint here.
pub struct YahooProvider {
    cache: MarketCache,
    history_range: String,
}

impl YahooProvider {
    /// Create a provider using the configured cache TTL and history range
    pub fn new(config: &QuorumConfig) -> Self {
        Self {
            cache: MarketCache::new(config.cache_ttl_quotes),
            history_range: config.history_range.clone(),
        }
    }

    async fn history(&self, ticker: &str) -> Result<History> {
        let key = CacheKey::new(
            ticker,
            "history",
            serde_json::json!({ "range": self.history_range }),
        );

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let history = fetch_history(ticker, &self.history_range).await?;
                serde_json::to_value(&history).map_err(MarketError::from)
            })
            .await?;

        serde_json::from_value(value).map_err(Into::into)
    }
}

async fn fetch_history(ticker: &str, range: &str) -> Result<History> {
    let connector = yahoo::YahooConnector::new().map_err(|e| MarketError::ProviderUnavailable {
        provider: "yahoo".to_string(),
        reason: e.to_string(),
    })?;

    let response = connector
        .get_quote_range(ticker, "1d", range)
        .await
        .map_err(|e| MarketError::YahooError(e.to_string()))?;

    let currency = response
        .metadata()
        .ok()
        .and_then(|meta| meta.currency)
        .unwrap_or_else(|| "USD".to_string());

    let quotes = response
        .quotes()
        .map_err(|e| MarketError::YahooError(e.to_string()))?;

    let bars = quotes
        .iter()
        .map(|q| Bar {
            timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
        })
        .collect();

    Ok(History { bars, currency })
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn is_available(&self) -> bool {
        match yahoo::YahooConnector::new() {
            Ok(connector) => connector.get_latest_quotes("AAPL", "1d").await.is_ok(),
            Err(_) => false,
        }
    }

    async fn price(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
        let history = self.history(ticker).await?;
        let Some(last) = history.bars.last() else {
            return Ok(None);
        };

        let currency = Currency::from_source(&history.currency);
        let price = currency.normalize(last.close);

        let change_pct = (history.bars.len() >= 2).then(|| {
            let prev = history.bars[history.bars.len() - 2].close;
            (last.close - prev) / prev * 100.0
        });

        Ok(Some(PriceSnapshot {
            ticker: ticker.to_string(),
            price,
            currency: currency.code,
            timestamp: Utc::now(),
            change_pct,
        }))
    }

    async fn technicals(&self, ticker: &str) -> Result<Option<TechnicalSnapshot>> {
        let history = self.history(ticker).await?;

        if history.bars.len() < MIN_BARS {
            debug!(
                ticker,
                bars = history.bars.len(),
                "not enough history for indicators"
            );
            return Ok(None);
        }

        match indicators::compute_technicals(ticker, &history.bars, &history.currency) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(MarketError::InsufficientBars { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn news(&self, _ticker: &str, _limit: usize) -> Result<Vec<NewsItem>> {
        Ok(Vec::new())
    }
}
