//! Multi-agent stock analysis
//!
//! This crate provides the data and analysis layer for quorum:
//!
//! - Market data providers with ordered fallback (Yahoo Finance, Google
//!   Finance scrape, DuckDuckGo news search)
//! - A technical indicator engine (SMA, RSI, MACD, Bollinger Bands, ATR,
//!   Stochastic RSI, support/resistance, trend scoring)
//! - Four prompt agents run strictly in sequence, each able to read the
//!   previous agents' output (ChartMaster, NewsHound, SignalPro, Director)
//!
//! # Architecture
//!
//! One analysis run resolves data once through the [`resolver`], feeds the
//! snapshot into the agent [`pipeline`], and renders the Director's final
//! recommendation. Providers are tried in priority order; the first price
//! and technical snapshots win, news accumulates across all sources.
//!
//! # Example
//!
//! ```rust,ignore
//! use quorum_llm::GroqClient;
//! use quorum_stock::pipeline::{default_analysts, AnalysisPipeline};
//! use quorum_stock::providers::{DuckDuckGoNewsProvider, YahooProvider};
//! use quorum_stock::QuorumConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(QuorumConfig::builder().with_env_api_key().build()?);
//!     let llm = Arc::new(GroqClient::new(config.groq_api_key.clone())?);
//!
//!     let pipeline = AnalysisPipeline::new(
//!         Arc::clone(&config),
//!         vec![
//!             Arc::new(YahooProvider::new(&config)),
//!             Arc::new(DuckDuckGoNewsProvider::new(&config)),
//!         ],
//!         default_analysts(),
//!         llm,
//!     );
//!
//!     let outcome = pipeline.run("LLOY.L", "Technical outlook").await;
//!     if let Some(report) = outcome.report("Director") {
//!         println!("{}", report.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod resolver;

// Re-export main types for convenience
pub use agents::{AgentReport, AnalysisInput, Analyst};
pub use config::{ModelTier, QuorumConfig};
pub use error::{MarketError, Result};
pub use model::{Bar, Currency, NewsItem, PriceSnapshot, Sentiment, TechnicalSnapshot, Trend};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline};
pub use resolver::{FallbackResolver, MarketBundle};
