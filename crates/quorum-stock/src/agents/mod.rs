//! Prompt agents
//!
//! Each agent turns the resolved market data (plus earlier agents' output)
//! into one prompt, makes a single chat call, and parses the reply into a
//! report. Call failures become failed reports, never propagated errors, so
//! one broken agent does not stop the pipeline.

mod chart_master;
mod director;
mod news_hound;
mod signal_pro;

pub use chart_master::ChartMaster;
pub use director::Director;
pub use news_hound::NewsHound;
pub use signal_pro::SignalPro;

use crate::config::ModelTier;
use crate::model::{NewsItem, PriceSnapshot, TechnicalSnapshot};
use async_trait::async_trait;
use quorum_llm::{ChatProvider, ChatRequest, Message};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const MAX_COMPLETION_TOKENS: usize = 1000;
const TEMPERATURE: f32 = 0.2;
const DEFAULT_CONFIDENCE: u8 = 5;

/// `[CONFIDENCE] 7` marker
static BRACKET_CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[CONFIDENCE\]\s*(\d+)").expect("valid confidence regex")
});

/// `Confidence: 7` marker
static LABEL_CONFIDENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Confidence:\s*(\d+)").expect("valid confidence regex"));

/// Structured input shared by every agent in one run
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub ticker: String,
    pub question: String,
    pub price: Option<PriceSnapshot>,
    pub technicals: TechnicalSnapshot,
    pub news: Vec<NewsItem>,
    /// Prior agents' output, keyed by lowercased agent name
    context: HashMap<String, String>,
}

impl AnalysisInput {
    /// Create input for a fresh run with an empty context
    pub fn new(
        ticker: impl Into<String>,
        question: impl Into<String>,
        price: Option<PriceSnapshot>,
        technicals: TechnicalSnapshot,
        news: Vec<NewsItem>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            question: question.into(),
            price,
            technicals,
            news,
            context: HashMap::new(),
        }
    }

    /// Store an agent's output for later agents
    pub fn remember(&mut self, agent_name: &str, content: impl Into<String>) {
        self.context.insert(agent_name.to_lowercase(), content.into());
    }

    /// A prior agent's output, if it ran and succeeded
    pub fn prior_output(&self, agent_name: &str) -> Option<&str> {
        self.context
            .get(&agent_name.to_lowercase())
            .map(String::as_str)
    }
}

/// One agent's parsed result
#[derive(Debug, Clone)]
pub struct AgentReport {
    pub agent_name: String,
    pub content: String,
    /// 1-10 from the response marker; 0 when the agent itself failed
    pub confidence: u8,
    pub metadata: HashMap<String, String>,
    pub success: bool,
}

impl AgentReport {
    /// A failed report for an agent whose chat call errored
    pub fn failure(agent_name: impl Into<String>, reason: &str) -> Self {
        Self {
            agent_name: agent_name.into(),
            content: format!("Error: {reason}"),
            confidence: 0,
            metadata: HashMap::new(),
            success: false,
        }
    }
}

/// A prompt agent
///
/// `build_prompt` and `parse_response` are pure; `execute` performs the one
/// permitted chat call.
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Agent display name (also the context key, lowercased)
    fn name(&self) -> &'static str;

    /// Which model tier the agent runs on
    fn tier(&self) -> ModelTier;

    /// Render the prompt for this input
    fn build_prompt(&self, input: &AnalysisInput) -> String;

    /// Parse the raw model reply into a report
    fn parse_response(&self, response: &str) -> AgentReport;

    /// Build the prompt, make one chat call, and parse the reply
    async fn execute(
        &self,
        llm: &dyn ChatProvider,
        model: &str,
        input: &AnalysisInput,
    ) -> AgentReport {
        let prompt = self.build_prompt(input);
        let request = ChatRequest::builder(model)
            .add_message(Message::user(prompt))
            .max_tokens(MAX_COMPLETION_TOKENS)
            .temperature(TEMPERATURE)
            .build();

        match llm.complete(request).await {
            Ok(response) => self.parse_response(&response.content),
            Err(e) => AgentReport::failure(self.name(), &e.to_string()),
        }
    }
}

/// Extract a `[CONFIDENCE] n` marker, defaulting to 5
pub(crate) fn bracket_confidence(response: &str) -> u8 {
    parse_confidence(&BRACKET_CONFIDENCE_RE, response)
}

/// Extract a `Confidence: n` marker, defaulting to 5
pub(crate) fn label_confidence(response: &str) -> u8 {
    parse_confidence(&LABEL_CONFIDENCE_RE, response)
}

fn parse_confidence(re: &Regex, response: &str) -> u8 {
    re.captures(response)
        .and_then(|captures| captures[1].parse::<u8>().ok())
        .map_or(DEFAULT_CONFIDENCE, |value| value.clamp(1, 10))
}

/// Truncate to at most `max_chars` characters on a char boundary
pub(crate) fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Format an optional monetary value with its currency symbol
pub(crate) fn money(symbol: &str, value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{symbol}{v:.2}"))
}

/// Format an optional plain number
pub(crate) fn number(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.precision$}"))
}
