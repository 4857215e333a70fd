//! Final recommendation agent

use super::{clip, label_confidence, AgentReport, AnalysisInput, Analyst};
use crate::config::ModelTier;
use chrono::Utc;
use std::collections::HashMap;

const CONTEXT_CHARS: usize = 400;

/// Final decision maker (smart tier)
///
/// Synthesizes the three prior agents' output into a single
/// buy/hold/sell/wait answer with a rationale and a top risk.
pub struct Director;

impl Analyst for Director {
    fn name(&self) -> &'static str {
        "Director"
    }

    fn tier(&self) -> ModelTier {
        ModelTier::Smart
    }

    fn build_prompt(&self, input: &AnalysisInput) -> String {
        let chart = input.prior_output("ChartMaster").unwrap_or("N/A");
        let news = input.prior_output("NewsHound").unwrap_or("N/A");
        let signal = input.prior_output("SignalPro").unwrap_or("N/A");

        format!(
            r"Director Final Recommendation for {ticker}

CHARTMASTER: {chart}
NEWSHOUND: {news}
SIGNALPRO: {signal}

QUESTION: {question}

FORMAT EXACTLY:
=== DIRECTOR ANSWER ===
Question: {question}
Answer: [Buy/Hold/Sell/Wait + one line reason]
Why: [Brief explanation]
Confidence: [1-10]/10
Data Sources: Yahoo Finance + DuckDuckGo News + Groq AI
Top Risk: [Single biggest risk]
Data Timestamp: {timestamp}",
            ticker = input.ticker,
            chart = clip(chart, CONTEXT_CHARS),
            news = clip(news, CONTEXT_CHARS),
            signal = clip(signal, CONTEXT_CHARS),
            question = input.question,
            timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }

    fn parse_response(&self, response: &str) -> AgentReport {
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "final".to_string());

        AgentReport {
            agent_name: self.name().to_string(),
            content: response.to_string(),
            confidence: label_confidence(response),
            metadata,
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_input;
    use super::*;

    #[test]
    fn test_prompt_gathers_all_prior_outputs() {
        let mut input = sample_input();
        input.remember("ChartMaster", "chart says up");
        input.remember("NewsHound", "news says up");
        input.remember("SignalPro", "Signal: Buy");

        let prompt = Director.build_prompt(&input);
        assert!(prompt.contains("Director Final Recommendation for LLOY.L"));
        assert!(prompt.contains("CHARTMASTER: chart says up"));
        assert!(prompt.contains("NEWSHOUND: news says up"));
        assert!(prompt.contains("SIGNALPRO: Signal: Buy"));
        assert!(prompt.contains("=== DIRECTOR ANSWER ==="));
    }

    #[test]
    fn test_prompt_truncates_long_context() {
        let mut input = sample_input();
        input.remember("ChartMaster", "y".repeat(900));

        let prompt = Director.build_prompt(&input);
        assert!(prompt.contains(&"y".repeat(400)));
        assert!(!prompt.contains(&"y".repeat(401)));
    }

    #[test]
    fn test_parse_response() {
        let response = "=== DIRECTOR ANSWER ===\nAnswer: Buy on momentum\nConfidence: 8/10";
        let report = Director.parse_response(response);
        assert!(report.success);
        assert_eq!(report.confidence, 8);
        assert_eq!(report.metadata["type"], "final");

        assert_eq!(Director.parse_response("garbled").confidence, 5);
    }
}
