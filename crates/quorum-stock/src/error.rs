//! Error types for market data and analysis operations

use thiserror::Error;

/// Errors produced by data providers, the indicator engine, and the resolver
#[derive(Debug, Error)]
pub enum MarketError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// A provider capability call failed
    #[error("Provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// Fewer bars than the longest indicator lookback requires
    #[error("Insufficient history: need {required} bars, got {got}")]
    InsufficientBars { required: usize, got: usize },

    /// No provider produced a usable technical snapshot; fatal for the run
    #[error("No technical data: {0}")]
    NoTechnicalData(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// LLM call error
    #[error("LLM error: {0}")]
    Llm(#[from] quorum_llm::LlmError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;
