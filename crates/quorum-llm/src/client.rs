//! Groq chat-completions client
//!
//! Groq exposes an OpenAI-compatible chat completions endpoint, so the wire
//! types here follow that format. The client enforces a per-minute request
//! budget before each call; a hosted free tier rejects bursts well below the
//! HTTP timeout, so the limiter sits client-side.

use crate::{ChatProvider, ChatRequest, ChatResponse, LlmError, Message, Result, TokenUsage};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Configuration for the Groq client
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: Groq's OpenAI-compatible endpoint)
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Client-side request budget per minute
    pub requests_per_minute: u32,
}

impl GroqConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GROQ_API_KEY` and, when set, the base URL
    /// from `GROQ_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            LlmError::ConfigurationError("GROQ_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("GROQ_API_BASE").unwrap_or_else(|_| DEFAULT_GROQ_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        })
    }

    /// Set a custom API base URL (any OpenAI-compatible endpoint works)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the per-minute request budget
    pub fn with_requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }
}

/// Groq chat-completions client
pub struct GroqClient {
    client: Client,
    config: GroqConfig,
    rate_limiter: SharedRateLimiter,
}

impl GroqClient {
    /// Create a new client with the given configuration
    pub fn with_config(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let quota = Quota::per_minute(
            NonZeroU32::new(config.requests_per_minute)
                .unwrap_or_else(|| NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE).expect("nonzero")),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GroqConfig::new(api_key))
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GroqConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GroqConfig {
        &self.config
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.rate_limiter.until_ready().await;

        debug!(
            model = %request.model,
            api_base = %self.config.api_base,
            "sending chat completion request"
        );

        let wire_request = WireRequest {
            model: request.model.clone(),
            messages: request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimitExceeded(error_text),
                400 => LlmError::InvalidRequest(error_text),
                404 => LlmError::ModelNotFound(request.model),
                _ => LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let wire_response: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let choice = wire_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        let usage = wire_response.usage.unwrap_or_default();

        debug!(
            finish_reason = %choice.finish_reason.as_deref().unwrap_or("unknown"),
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            "received chat completion response"
        );

        Ok(ChatResponse {
            content,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

// ============================================================================
// Wire types (OpenAI-compatible)
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}
