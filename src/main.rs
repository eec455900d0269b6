//! Relaybot CLI entry point.

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relaybot")]
#[command(about = "A single-channel Discord relay bot for the Gemini API")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = relaybot::config::Config::load()
        .with_context(|| "failed to load configuration from environment")?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        model = %config.model,
        keys = config.api_keys.len(),
        channel_id = config.allowed_channel_id,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .with_context(|| "failed to build HTTP client")?;

    let pipeline = Arc::new(relaybot::pipeline::TurnPipeline::new(
        config.allowed_channel_id,
        relaybot::ratelimit::RateLimiter::new(config.cooldown),
        relaybot::transcript::TranscriptStore::new(&config.data_dir),
        Arc::new(relaybot::ocr::OcrExtractor::new(http.clone())),
        Arc::new(relaybot::llm::GeminiClient::new(
            http,
            config.model.clone(),
            config.api_keys.clone(),
        )),
    ));

    tracing::info!("relaybot starting");

    tokio::select! {
        result = relaybot::discord::run(&config.discord_token, pipeline) => {
            result.with_context(|| "discord gateway connection ended")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("relaybot stopped");
    Ok(())
}
