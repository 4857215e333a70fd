//! Command-line interface for quorum

mod render;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use quorum_llm::{GroqClient, GroqConfig};
use quorum_stock::pipeline::{default_analysts, AnalysisPipeline};
use quorum_stock::providers::{
    DuckDuckGoNewsProvider, GoogleFinanceProvider, MarketDataProvider, YahooProvider,
};
use quorum_stock::QuorumConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Price/technicals source priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Yahoo Finance only
    Yahoo,
    /// Google Finance only
    Google,
    /// Yahoo first, Google as fallback
    All,
}

#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(about = "Multi-agent stock analysis with LLM agents", long_about = None)]
struct Args {
    /// Ticker symbol to analyze (e.g. AAPL, LLOY.L)
    ticker: Option<String>,

    /// Question for the agents
    #[arg(short, long, default_value = "Technical outlook")]
    question: String,

    /// Which market data source to prefer
    #[arg(short, long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// Maximum headlines per news source
    #[arg(long, default_value_t = 5)]
    max_news: usize,

    /// Probe provider availability and exit
    #[arg(long)]
    check_sources: bool,
}

/// Initialize tracing subscriber with default configuration
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Market data providers in priority order; news search always runs last
fn build_providers(source: Source, config: &QuorumConfig) -> Vec<Arc<dyn MarketDataProvider>> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

    match source {
        Source::Yahoo => providers.push(Arc::new(YahooProvider::new(config))),
        Source::Google => providers.push(Arc::new(GoogleFinanceProvider::new())),
        Source::All => {
            providers.push(Arc::new(YahooProvider::new(config)));
            providers.push(Arc::new(GoogleFinanceProvider::new()));
        }
    }

    providers.push(Arc::new(DuckDuckGoNewsProvider::new(config)));
    providers
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut config = QuorumConfig::default().with_env_api_key();
    config.max_news_items = args.max_news;
    let config = Arc::new(config);

    let providers = build_providers(args.source, &config);

    if args.check_sources {
        let mut rows = Vec::with_capacity(providers.len());
        for provider in &providers {
            rows.push((provider.name(), provider.is_available().await));
        }
        render::print_source_table(&rows);
        return Ok(());
    }

    let ticker = args
        .ticker
        .context("a ticker argument is required (try: quorum LLOY.L)")?;
    let ticker = ticker.to_uppercase();

    config.validate()?;

    let groq = GroqConfig::new(config.groq_api_key.clone())
        .with_api_base(config.groq_api_base.clone())
        .with_timeout(config.request_timeout.as_secs())
        .with_requests_per_minute(config.requests_per_minute);
    let llm = Arc::new(GroqClient::with_config(groq)?);

    info!(ticker, source = ?args.source, "starting quorum");

    let pipeline = AnalysisPipeline::new(Arc::clone(&config), providers, default_analysts(), llm);

    render::print_header(&ticker, &args.question);
    let outcome = pipeline.run(&ticker, &args.question).await;

    if !outcome.success {
        let reason = outcome.error.unwrap_or_else(|| "unknown failure".to_string());
        eprintln!("\nAnalysis failed: {reason}");
        std::process::exit(1);
    }

    render::print_outcome(&outcome);
    Ok(())
}
