//! Trading signal agent

use super::{clip, label_confidence, AgentReport, AnalysisInput, Analyst};
use crate::config::ModelTier;
use chrono::Utc;
use std::collections::HashMap;

const CONTEXT_CHARS: usize = 300;

/// Buy/Hold/Sell signal synthesizer (smart tier)
///
/// Reads ChartMaster's and NewsHound's output from the run context.
pub struct SignalPro;

/// Extract the trade signal from the model reply; Hold when ambiguous
fn extract_signal(response: &str) -> &'static str {
    let upper = response.to_uppercase();
    if upper.contains("BUY") {
        "Buy"
    } else if upper.contains("SELL") {
        "Sell"
    } else {
        "Hold"
    }
}

impl Analyst for SignalPro {
    fn name(&self) -> &'static str {
        "SignalPro"
    }

    fn tier(&self) -> ModelTier {
        ModelTier::Smart
    }

    fn build_prompt(&self, input: &AnalysisInput) -> String {
        let tech = &input.technicals;
        let chart = input.prior_output("ChartMaster").unwrap_or("N/A");
        let news = input.prior_output("NewsHound").unwrap_or("N/A");

        format!(
            r"SignalPro Trading Analysis for {ticker}

TECHNICAL DATA:
- Price: {sym}{current:.2} {currency}
- Trend: {trend}

CHART ANALYSIS:
{chart}

NEWS ANALYSIS:
{news}

QUESTION: {question}

FORMAT:
[TIMESTAMP] {timestamp}
[SUMMARY] One line trade bias
Signal: Buy/Hold/Sell
Confidence: 1-10
DONE",
            ticker = input.ticker,
            sym = tech.symbol,
            current = tech.current,
            currency = tech.currency,
            trend = tech.trend,
            chart = clip(chart, CONTEXT_CHARS),
            news = clip(news, CONTEXT_CHARS),
            question = input.question,
            timestamp = Utc::now().format("%Y-%m-%d %H:%M UTC"),
        )
    }

    fn parse_response(&self, response: &str) -> AgentReport {
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "signal".to_string());
        metadata.insert("signal".to_string(), extract_signal(response).to_string());

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
    fn test_prompt_embeds_prior_context() {
        let mut input = sample_input();
        input.remember("ChartMaster", "Uptrend with strong momentum");
        input.remember("NewsHound", "Sentiment bullish on profit beat");

        let prompt = SignalPro.build_prompt(&input);
        assert!(prompt.contains("SignalPro Trading Analysis for LLOY.L"));
        assert!(prompt.contains("Price: £54.32 GBP"));
        assert!(prompt.contains("Uptrend with strong momentum"));
        assert!(prompt.contains("Sentiment bullish on profit beat"));
    }

    #[test]
    fn test_prompt_without_context_shows_na() {
        let prompt = SignalPro.build_prompt(&sample_input());
        assert!(prompt.contains("CHART ANALYSIS:\nN/A"));
        assert!(prompt.contains("NEWS ANALYSIS:\nN/A"));
    }

    #[test]
    fn test_prior_context_is_truncated() {
        let mut input = sample_input();
        input.remember("ChartMaster", "x".repeat(1000));

        let prompt = SignalPro.build_prompt(&input);
        assert!(!prompt.contains(&"x".repeat(301)));
        assert!(prompt.contains(&"x".repeat(300)));
    }

    #[test]
    fn test_signal_extraction() {
        assert_eq!(extract_signal("Signal: Buy\nConfidence: 8"), "Buy");
        assert_eq!(extract_signal("I would sell here"), "Sell");
        assert_eq!(extract_signal("Stay on the sidelines"), "Hold");
    }

    #[test]
    fn test_parse_response() {
        let report = SignalPro.parse_response("[SUMMARY] Momentum favors longs\nSignal: Buy\nConfidence: 7\nDONE");
        assert!(report.success);
        assert_eq!(report.confidence, 7);
        assert_eq!(report.metadata["signal"], "Buy");
        assert_eq!(report.metadata["type"], "signal");
    }
}
