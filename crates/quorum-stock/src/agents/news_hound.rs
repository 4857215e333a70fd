//! News sentiment analysis agent

use super::{bracket_confidence, AgentReport, AnalysisInput, Analyst};
use crate::config::ModelTier;
use chrono::Utc;
use std::collections::HashMap;
use std::fmt::Write;

const HEADLINES_IN_LIST: usize = 5;
const HEADLINES_IN_TABLE: usize = 3;

/// Headline sentiment analyst (fast tier)
pub struct NewsHound;

impl Analyst for NewsHound {
    fn name(&self) -> &'static str {
        "NewsHound"
    }

    fn tier(&self) -> ModelTier {
        ModelTier::Fast
    }

    fn build_prompt(&self, input: &AnalysisInput) -> String {
        if input.news.is_empty() {
            return format!("No news available for {}", input.ticker);
        }

        let mut headlines = String::new();
        for item in input.news.iter().take(HEADLINES_IN_LIST) {
            let _ = writeln!(headlines, "- {} ({})", item.title, item.sentiment);
        }

        let mut table = String::new();
        for item in input.news.iter().take(HEADLINES_IN_TABLE) {
            let _ = writeln!(
                table,
                "{}|{}|{}|{}",
                item.date.format("%Y-%m-%d"),
                item.source,
                item.title,
                item.sentiment
            );
        }

        format!(
            r"NewsHound Analysis for {ticker}

RECENT NEWS:
{headlines}
QUESTION: {question}

FORMAT EXACTLY:
[TIMESTAMP] {timestamp}
[SOURCES] {count} articles
[SUMMARY] One line: overall sentiment + key catalyst
[TABLE]
Date|Source|Headline|Sentiment
{table}[CONFIDENCE] 1-10",
            ticker = input.ticker,
            headlines = headlines,
            question = input.question,
            timestamp = Utc::now().format("%Y-%m-%d %H:%M UTC"),
            count = input.news.len(),
            table = table,
        )
    }

    fn parse_response(&self, response: &str) -> AgentReport {
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "news".to_string());

        AgentReport {
            agent_name: self.name().to_string(),
            content: response.to_string(),
            confidence: bracket_confidence(response),
            metadata,
            success: true,
        }
    }
}
