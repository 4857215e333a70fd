//! Sequential analysis pipeline
//!
//! One run resolves market data once, then executes agents strictly in
//! order; each agent's successful output is stored in the run context so
//! later agents can embed it. Only a missing technical snapshot aborts a
//! run; a failing agent is recorded and the pipeline moves on.

use crate::agents::{AgentReport, AnalysisInput, Analyst, ChartMaster, Director, NewsHound, SignalPro};
use crate::config::QuorumConfig;
use crate::error::MarketError;
use crate::providers::MarketDataProvider;
use crate::resolver::FallbackResolver;
use quorum_llm::ChatProvider;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one pipeline run
///
/// Failure is a value, not an error: `success` is false only when no
/// provider produced technical data, with the reason in `error`.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub ticker: String,
    pub success: bool,
    pub reports: Vec<AgentReport>,
    pub error: Option<String>,
}

impl AnalysisOutcome {
    fn failure(ticker: &str, reason: String) -> Self {
        Self {
            ticker: ticker.to_string(),
            success: false,
            reports: Vec::new(),
            error: Some(reason),
        }
    }

    /// A named agent's report, if it ran
    pub fn report(&self, agent_name: &str) -> Option<&AgentReport> {
        self.reports.iter().find(|r| r.agent_name == agent_name)
    }
}

/// The canonical four-agent lineup, in execution order
pub fn default_analysts() -> Vec<Arc<dyn Analyst>> {
    vec![
        Arc::new(ChartMaster),
        Arc::new(NewsHound),
        Arc::new(SignalPro),
        Arc::new(Director),
    ]
}

/// Full analysis pipeline: data resolution followed by sequential agents
pub struct AnalysisPipeline {
    config: Arc<QuorumConfig>,
    resolver: FallbackResolver,
    analysts: Vec<Arc<dyn Analyst>>,
    llm: Arc<dyn ChatProvider>,
}

impl AnalysisPipeline {
    /// Create a pipeline over providers (priority order) and agents
    /// (execution order)
    pub fn new(
        config: Arc<QuorumConfig>,
        providers: Vec<Arc<dyn MarketDataProvider>>,
        analysts: Vec<Arc<dyn Analyst>>,
        llm: Arc<dyn ChatProvider>,
    ) -> Self {
        let resolver = FallbackResolver::new(providers, config.max_news_items);
        Self {
            config,
            resolver,
            analysts,
            llm,
        }
    }

    /// Run a full analysis for a ticker
    pub async fn run(&self, ticker: &str, question: &str) -> AnalysisOutcome {
        info!(ticker, question, "starting analysis run");

        let bundle = match self.resolver.resolve(ticker).await {
            Ok(bundle) => bundle,
            Err(MarketError::NoTechnicalData(reason)) => {
                warn!(ticker, %reason, "analysis aborted");
                return AnalysisOutcome::failure(ticker, reason);
            }
            Err(e) => {
                warn!(ticker, error = %e, "analysis aborted");
                return AnalysisOutcome::failure(ticker, e.to_string());
            }
        };

        let mut input = AnalysisInput::new(
            ticker,
            question,
            bundle.price,
            bundle.technicals,
            bundle.news,
        );

        let mut reports = Vec::with_capacity(self.analysts.len());
        for analyst in &self.analysts {
            let name = analyst.name();
            info!(agent = name, "running agent");

            let model = self.config.model_for(analyst.tier());
            let report = analyst.execute(self.llm.as_ref(), model, &input).await;

            if report.success {
                input.remember(name, report.content.clone());
                info!(agent = name, confidence = report.confidence, "agent complete");
            } else {
                warn!(agent = name, "agent failed");
            }
            reports.push(report);
        }

        AnalysisOutcome {
            ticker: ticker.to_string(),
            success: true,
            reports,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceSnapshot, TechnicalSnapshot, Trend};
    use crate::providers::MockMarketDataProvider;
    use chrono::Utc;
    use quorum_llm::{ChatRequest, ChatResponse, LlmError, TokenUsage};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn technical_snapshot() -> TechnicalSnapshot {
        TechnicalSnapshot {
            ticker: "LLOY.L".to_string(),
            current: 54.32,
            sma20: 53.1,
            sma50: 51.8,
            rsi: 61.5,
            trend: Trend::Bullish,
            support: 50.25,
            resistance: 56.4,
            currency: "GBP".to_string(),
            symbol: "£".to_string(),
            macd_line: Some(0.42),
            macd_signal: Some(0.31),
            macd_histogram: Some(0.11),
            bb_upper: Some(56.0),
            bb_middle: Some(53.1),
            bb_lower: Some(50.2),
            bb_width: Some(10.9),
            volume: Some(12_500_000),
            volume_sma20: Some(9_800_000.0),
            atr: Some(1.15),
            stoch_rsi: Some(72.0),
        }
    }

    fn data_provider() -> MockMarketDataProvider {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_name().return_const("stub");
        provider.expect_price().returning(|_| {
            Ok(Some(PriceSnapshot {
                ticker: "LLOY.L".to_string(),
                price: 54.32,
                currency: "GBP".to_string(),
                timestamp: Utc::now(),
                change_pct: Some(0.4),
            }))
        });
        provider
            .expect_technicals()
            .returning(|_| Ok(Some(technical_snapshot())));
        provider.expect_news().returning(|_, _| Ok(Vec::new()));
        provider
    }

    fn failing_provider() -> MockMarketDataProvider {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_name().return_const("down");
        provider
            .expect_price()
            .returning(|_| Err(MarketError::ApiError("down".to_string())));
        provider.expect_technicals().returning(|_| Ok(None));
        provider.expect_news().returning(|_, _| Ok(Vec::new()));
        provider
    }

    /// Chat stub that records prompts and optionally fails the nth call
    struct ScriptedChat {
        requests: Mutex<Vec<ChatRequest>>,
        calls: AtomicUsize,
        fail_call: Option<usize>,
    }

    impl ScriptedChat {
        fn new(fail_call: Option<usize>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_call,
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.messages[0].content.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl ChatProvider for ScriptedChat {
        async fn complete(&self, request: ChatRequest) -> quorum_llm::Result<ChatResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            if self.fail_call == Some(call) {
                return Err(LlmError::RateLimitExceeded("over budget".to_string()));
            }

            Ok(ChatResponse {
                content: format!("[SUMMARY] reply {call}\nSignal: Buy\nConfidence: 7\n[CONFIDENCE] 7"),
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn test_config() -> Arc<QuorumConfig> {
        Arc::new(
            QuorumConfig::builder()
                .groq_api_key("gsk-test")
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_full_run_threads_context_between_agents() {
        let chat = Arc::new(ScriptedChat::new(None));
        let pipeline = AnalysisPipeline::new(
            test_config(),
            vec![Arc::new(data_provider())],
            default_analysts(),
            Arc::clone(&chat) as Arc<dyn ChatProvider>,
        );

        let outcome = pipeline.run("LLOY.L", "Technical outlook").await;

        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.reports.len(), 4);
        assert!(outcome.report("Director").is_some());
        assert_eq!(
            outcome.report("SignalPro").unwrap().metadata["signal"],
            "Buy"
        );

        // SignalPro's prompt (third call) embeds ChartMaster's reply (first
        // call), and Director's embeds SignalPro's.
        let prompts = chat.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[2].contains("reply 0"));
        assert!(prompts[3].contains("reply 2"));
    }

    #[tokio::test]
    async fn test_no_technical_data_short_circuits() {
        let chat = Arc::new(ScriptedChat::new(None));
        let pipeline = AnalysisPipeline::new(
            test_config(),
            vec![Arc::new(failing_provider())],
            default_analysts(),
            Arc::clone(&chat) as Arc<dyn ChatProvider>,
        );

        let outcome = pipeline.run("LLOY.L", "Technical outlook").await;

        assert!(!outcome.success);
        assert!(outcome.reports.is_empty());
        assert_eq!(
            outcome.error.as_deref(),
            Some("Could not fetch technical data from any source")
        );
        // No agent ever ran
        assert!(chat.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_does_not_stop_pipeline() {
        let chat = Arc::new(ScriptedChat::new(Some(0)));
        let pipeline = AnalysisPipeline::new(
            test_config(),
            vec![Arc::new(data_provider())],
            default_analysts(),
            Arc::clone(&chat) as Arc<dyn ChatProvider>,
        );

        let outcome = pipeline.run("LLOY.L", "Technical outlook").await;

        assert!(outcome.success);
        assert_eq!(outcome.reports.len(), 4);

        let chart = outcome.report("ChartMaster").unwrap();
        assert!(!chart.success);
        assert_eq!(chart.confidence, 0);
        assert!(chart.content.contains("Rate limit exceeded"));

        // Later agents still ran and succeeded; the failed agent's output
        // never entered the context.
        assert!(outcome.report("Director").unwrap().success);
        let prompts = chat.prompts();
        assert!(prompts[2].contains("CHART ANALYSIS:\nN/A"));
    }
}
