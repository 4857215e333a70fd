//! Configuration for analysis runs

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model tier an agent runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTier {
    /// Cheap model for per-domain analysts
    Fast,
    /// Stronger model for synthesis and decision agents
    Smart,
}

/// Configuration for an analysis run
///
/// Passed explicitly to constructors; nothing reads ambient process state
/// except the `from_env`/`with_env_api_key` helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuorumConfig {
    /// Groq API key
    pub groq_api_key: String,

    /// Groq API base URL (OpenAI-compatible)
    pub groq_api_base: String,

    /// Model id for the fast tier
    pub fast_model: String,

    /// Model id for the smart tier
    pub smart_model: String,

    /// Client-side LLM request budget per minute
    pub requests_per_minute: u32,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Cache TTL for quotes and history
    pub cache_ttl_quotes: Duration,

    /// Cache TTL for news data
    pub cache_ttl_news: Duration,

    /// Maximum news items requested per provider
    pub max_news_items: usize,

    /// History range for indicator input (Yahoo range string)
    pub history_range: String,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            groq_api_base: "https://api.groq.com/openai/v1".to_string(),
            fast_model: "llama-3.1-8b-instant".to_string(),
            smart_model: "llama-3.3-70b-versatile".to_string(),
            requests_per_minute: 30,
            request_timeout: Duration::from_secs(30),
            cache_ttl_quotes: Duration::from_secs(60), // 1 minute
            cache_ttl_news: Duration::from_secs(300),  // 5 minutes
            max_news_items: 5,
            history_range: "3mo".to_string(),
        }
    }
}

impl QuorumConfig {
    /// Create a new configuration builder
    pub fn builder() -> QuorumConfigBuilder {
        QuorumConfigBuilder::default()
    }

    /// Load the Groq API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.groq_api_key = key;
        }
        self
    }

    /// The model id for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Smart => &self.smart_model,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.groq_api_key.is_empty() {
            return Err(MarketError::ConfigError(
                "Groq API key is not set (set GROQ_API_KEY)".to_string(),
            ));
        }

        if self.requests_per_minute == 0 {
            return Err(MarketError::ConfigError(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`QuorumConfig`]
#[derive(Debug, Default)]
pub struct QuorumConfigBuilder {
    groq_api_key: Option<String>,
    groq_api_base: Option<String>,
    fast_model: Option<String>,
    smart_model: Option<String>,
    requests_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
    cache_ttl_quotes: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    max_news_items: Option<usize>,
    history_range: Option<String>,
}

impl QuorumConfigBuilder {
    /// Set the Groq API key
    pub fn groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    /// Set the Groq API base URL
    pub fn groq_api_base(mut self, base: impl Into<String>) -> Self {
        self.groq_api_base = Some(base.into());
        self
    }

    /// Set the fast-tier model id
    pub fn fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast_model = Some(model.into());
        self
    }

    /// Set the smart-tier model id
    pub fn smart_model(mut self, model: impl Into<String>) -> Self {
        self.smart_model = Some(model.into());
        self
    }

    /// Set the per-minute LLM request budget
    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the quote cache TTL
    pub fn cache_ttl_quotes(mut self, ttl: Duration) -> Self {
        self.cache_ttl_quotes = Some(ttl);
        self
    }

    /// Set the news cache TTL
    pub fn cache_ttl_news(mut self, ttl: Duration) -> Self {
        self.cache_ttl_news = Some(ttl);
        self
    }

    /// Set the maximum news items per provider
    pub fn max_news_items(mut self, max: usize) -> Self {
        self.max_news_items = Some(max);
        self
    }

    /// Set the history range
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Load the Groq API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.groq_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<QuorumConfig> {
        let defaults = QuorumConfig::default();

        let config = QuorumConfig {
            groq_api_key: self.groq_api_key.unwrap_or(defaults.groq_api_key),
            groq_api_base: self.groq_api_base.unwrap_or(defaults.groq_api_base),
            fast_model: self.fast_model.unwrap_or(defaults.fast_model),
            smart_model: self.smart_model.unwrap_or(defaults.smart_model),
            requests_per_minute: self
                .requests_per_minute
                .unwrap_or(defaults.requests_per_minute),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            cache_ttl_quotes: self.cache_ttl_quotes.unwrap_or(defaults.cache_ttl_quotes),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            max_news_items: self.max_news_items.unwrap_or(defaults.max_news_items),
            history_range: self.history_range.unwrap_or(defaults.history_range),
        };

        config.validate()?;
        Ok(config)
    }
}
