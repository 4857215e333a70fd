//! Market data providers
//!
//! Each provider implements the [`MarketDataProvider`] capability trait. A
//! capability that has no data returns a typed absence (`Ok(None)` or an
//! empty list); `Err` is reserved for true I/O failure. The resolver treats
//! both as failure for that capability and moves on.

mod google;
mod news;
mod yahoo;

pub use google::GoogleFinanceProvider;
pub use news::DuckDuckGoNewsProvider;
pub use yahoo::YahooProvider;

use crate::error::Result;
use crate::model::{NewsItem, PriceSnapshot, TechnicalSnapshot};
use async_trait::async_trait;

/// Capability set offered by a market data source
///
/// One implementation level per source; providers that lack a capability
/// return the typed absence rather than erroring.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name used in logs and source chains
    fn name(&self) -> &'static str;

    /// Cheap reachability probe; never used to gate the fallback chain
    async fn is_available(&self) -> bool;

    /// Latest normalized price, or `None` when the source has no quote
    async fn price(&self, ticker: &str) -> Result<Option<PriceSnapshot>>;

    /// Technical snapshot, or `None` when the source cannot produce one
    /// (including too little history for the indicator engine)
    async fn technicals(&self, ticker: &str) -> Result<Option<TechnicalSnapshot>>;

    /// Recent headlines, possibly empty
    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsItem>>;
}
