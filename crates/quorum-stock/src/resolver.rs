//! Provider fallback resolution
//!
//! Walks an ordered provider list exactly once. Price and technicals keep the
//! first non-absent result; news accumulates across every provider. A failed
//! (provider, capability) pair is logged and skipped without affecting the
//! provider's other capabilities or later providers.

use crate::error::{MarketError, Result};
use crate::model::{NewsItem, PriceSnapshot, TechnicalSnapshot};
use crate::providers::MarketDataProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolved market data for one analysis run
///
/// Technicals are required for a successful resolution; price may be absent
/// and the news list may be empty.
#[derive(Debug, Clone)]
pub struct MarketBundle {
    pub price: Option<PriceSnapshot>,
    pub technicals: TechnicalSnapshot,
    pub news: Vec<NewsItem>,
}

/// Ordered-fallback resolver over a provider list
pub struct FallbackResolver {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    max_news_items: usize,
}

impl FallbackResolver {
    /// Create a resolver over providers in priority order
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>, max_news_items: usize) -> Self {
        Self {
            providers,
            max_news_items,
        }
    }

    /// Resolve price, technicals, and news for a ticker
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NoTechnicalData`] when no provider produced a
    /// technical snapshot; every other provider failure is swallowed.
    pub async fn resolve(&self, ticker: &str) -> Result<MarketBundle> {
        let mut price: Option<PriceSnapshot> = None;
        let mut technicals: Option<TechnicalSnapshot> = None;
        let mut news: Vec<NewsItem> = Vec::new();

        for provider in &self.providers {
            let name = provider.name();
            debug!(provider = name, ticker, "trying provider");

            if price.is_none() {
                match provider.price(ticker).await {
                    Ok(Some(snapshot)) => {
                        info!(provider = name, ticker, "got price");
                        price = Some(snapshot);
                    }
                    Ok(None) => debug!(provider = name, ticker, "no price data"),
                    Err(e) => warn!(provider = name, ticker, error = %e, "price failed"),
                }
            }

            if technicals.is_none() {
                match provider.technicals(ticker).await {
                    Ok(Some(snapshot)) => {
                        info!(provider = name, ticker, "got technicals");
                        technicals = Some(snapshot);
                    }
                    Ok(None) => debug!(provider = name, ticker, "no technical data"),
                    Err(e) => warn!(provider = name, ticker, error = %e, "technicals failed"),
                }
            }

            match provider.news(ticker, self.max_news_items).await {
                Ok(items) if !items.is_empty() => {
                    info!(provider = name, ticker, count = items.len(), "got news");
                    news.extend(items);
                }
                Ok(_) => debug!(provider = name, ticker, "no news"),
                Err(e) => warn!(provider = name, ticker, error = %e, "news failed"),
            }
        }

        let Some(technicals) = technicals else {
            return Err(MarketError::NoTechnicalData(
                "Could not fetch technical data from any source".to_string(),
            ));
        };

        Ok(MarketBundle {
            price,
            technicals,
            news,
        })
    }
}
