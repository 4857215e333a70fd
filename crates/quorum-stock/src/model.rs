//! Domain model for one analysis run
//!
//! All entities here are constructed fresh per request, never mutated after
//! construction, and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One OHLCV record for a single trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Latest price for a ticker, currency-normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub ticker: String,
    pub price: f64,
    /// ISO currency code, always major-unit (see [`Currency`])
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub change_pct: Option<f64>,
}

/// Directional trend label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Headline sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Technical indicator snapshot for a ticker
///
/// The advanced indicator fields are `Option`: they are populated when the
/// indicator engine had enough bars, and absent when a provider could only
/// derive an approximation. Absence is never encoded as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub ticker: String,
    pub current: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub rsi: f64,
    pub trend: Trend,
    pub support: f64,
    pub resistance: f64,
    /// ISO currency code, always major-unit
    pub currency: String,
    /// Display symbol for the currency
    pub symbol: String,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub volume: Option<u64>,
    pub volume_sma20: Option<f64>,
    pub atr: Option<f64>,
    pub stoch_rsi: Option<f64>,
}

/// One news headline with derived sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub date: NaiveDate,
    pub url: String,
    pub sentiment: Sentiment,
}

/// Currency normalization
///
/// Some sources report prices in a minor unit (London quotes in pence, code
/// `GBp`). Every monetary value that enters the model passes through
/// [`Currency::normalize`] with the factor from the source-reported code, so
/// snapshots always carry major-unit values and codes. Normalizing an
/// already-major code is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Major-unit ISO code
    pub code: String,
    /// Display symbol
    pub symbol: String,
    factor: f64,
}

impl Currency {
    /// Interpret a source-reported currency code
    pub fn from_source(code: &str) -> Self {
        match code {
            // Pence sterling, 1/100 GBP
            "GBp" | "GBX" => Self {
                code: "GBP".to_string(),
                symbol: "£".to_string(),
                factor: 100.0,
            },
            other => Self {
                code: other.to_string(),
                symbol: symbol_for(other).to_string(),
                factor: 1.0,
            },
        }
    }

    /// Convert a source value to the major unit
    pub fn normalize(&self, value: f64) -> f64 {
        value / self.factor
    }
}

fn symbol_for(code: &str) -> &'static str {
    match code {
        "GBP" => "£",
        "EUR" => "€",
        "JPY" => "¥",
        _ => "$",
    }
}
