//! Basic end-to-end analysis run
//!
//! Requires GROQ_API_KEY to be set:
//! ```sh
//! GROQ_API_KEY=gsk-... cargo run --example basic_analysis
//! ```

use quorum_llm::GroqClient;
use quorum_stock::pipeline::{default_analysts, AnalysisPipeline};
use quorum_stock::providers::{DuckDuckGoNewsProvider, YahooProvider};
use quorum_stock::QuorumConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(QuorumConfig::builder().with_env_api_key().build()?);
    let llm = Arc::new(GroqClient::new(config.groq_api_key.clone())?);

    let pipeline = AnalysisPipeline::new(
        Arc::clone(&config),
        vec![
            Arc::new(YahooProvider::new(&config)),
            Arc::new(DuckDuckGoNewsProvider::new(&config)),
        ],
        default_analysts(),
        llm,
    );

    let outcome = pipeline.run("LLOY.L", "Technical outlook").await;

    if !outcome.success {
        eprintln!("analysis failed: {}", outcome.error.unwrap_or_default());
        return Ok(());
    }

    for report in &outcome.reports {
        println!("=== {} (confidence {}/10) ===", report.agent_name, report.confidence);
        println!("{}\n", report.content);
    }

    Ok(())
}
