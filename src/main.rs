//! Binary entrypoint: wire the transport, pipeline, and liveness listener
//! together and poll until the process is killed.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use tahlil::config::{self, Config};
use tahlil::health::LivenessServer;
use tahlil::media::{FfmpegExtractor, GeminiVisionProvider, GroqWhisperProvider};
use tahlil::pipeline::{Pipeline, ProcessingSet, VideoSource};
use tahlil::telegram::{BotApi, Router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().await.context("loading configuration")?;

    let mut liveness = LivenessServer::new(config.port);
    liveness
        .start()
        .await
        .context("starting liveness listener")?;

    let client = reqwest::Client::new();
    let api = Arc::new(BotApi::new(
        client.clone(),
        config.telegram_token.expose_secret(),
    ));
    let extractor = Arc::new(FfmpegExtractor::default());
    let transcriber = Arc::new(
        GroqWhisperProvider::new(
            client.clone(),
            config.groq_api_key.expose_secret().to_string(),
        )
        .with_model(config::WHISPER_MODEL.to_string()),
    );
    let vision = Arc::new(GeminiVisionProvider::new(
        client,
        config.gemini_api_key.expose_secret().to_string(),
        config::GEMINI_MODEL.to_string(),
    ));
    let processing = Arc::new(ProcessingSet::new());

    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&api) as Arc<dyn VideoSource>,
        extractor,
        transcriber,
        vision,
        Arc::clone(&processing),
        config.workdir.clone(),
    ));

    tracing::info!("tahlil is up, polling for updates");
    Router::new(api, pipeline, processing).run().await;

    Ok(())
}
