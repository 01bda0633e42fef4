pub mod ai;
pub mod app;
pub mod assets;
pub mod config;
pub mod llm;
pub mod stt;
pub mod tts;
pub mod utils;

use crate::ai::pipeline::TurnPipeline;
use crate::app::{spawn_stdin_reader, CompanionApp, TerminalPresenter};
use crate::assets::DirectoryAssetResolver;
use crate::llm::OpenAIClient;
use crate::stt::SpeechInput;
use crate::tts::VoiceService;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Respects RUST_LOG, defaults to info. Stdout belongs to the presenter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG from it applies to the subscriber.
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to read .env"),
    }

    let path = config::config_path();
    if path.exists() {
        tracing::info!(path = %path.display(), "using config file");
    } else {
        tracing::info!(path = %path.display(), "no config file, using defaults and environment");
    }
    let config = config::load_config(&path);
    config.validate(&path)?;

    let llm = OpenAIClient::from_config(&config.llm);
    tracing::info!(model = %llm.model(), base_url = %config.llm.base_url, "chat client ready");
    let pipeline = TurnPipeline::new(Arc::new(llm), &config.character, config.history.format);

    let resolver = DirectoryAssetResolver::new(config.assets.clone());
    let voice = VoiceService::from_config(&config.tts);
    let speech = SpeechInput::from_config(&config.stt);

    let app = CompanionApp::new(
        config.character.name.clone(),
        config.history.max_turns,
        pipeline,
        Arc::new(resolver),
        voice,
        speech,
        TerminalPresenter::stdout(),
    );

    println!(
        "{} is here. Type to chat, /mic to speak, /chat to hide the transcript, /quit to leave.",
        config.character.name
    );
    let _reader = spawn_stdin_reader(app.sender());
    app.run().await;
    Ok(())
}
