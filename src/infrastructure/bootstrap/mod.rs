//! Startup wiring shared by the HTTP server and the serverless worker.

use crate::domain::tts::TtsService;
use crate::infrastructure::config::{Config, LogFormat};
use crate::infrastructure::onnx::{ChatterboxModel, PhonikudModel};
use crate::infrastructure::repositories::{
    ChatterboxTtsRepository, FfmpegAudioEncoderRepository, PhonikudDiacriticsRepository,
};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Load both models and wire the repositories into a `TtsService`
pub fn build_tts_service(config: &Config) -> anyhow::Result<TtsService> {
    // === DEPENDENCY INJECTION SETUP ===
    // 1. Load models
    let start_time = Instant::now();
    tracing::info!(
        model = %config.phonikud_model_path.display(),
        tokenizer = %config.phonikud_tokenizer_path.display(),
        "Loading Phonikud model..."
    );
    let phonikud = PhonikudModel::load(
        &config.phonikud_model_path,
        &config.phonikud_tokenizer_path,
        config.onnx_threads,
    )
    .context("Failed to load Phonikud model")?;

    tracing::info!(
        model_dir = %config.chatterbox_model_dir.display(),
        "Loading Chatterbox multilingual model..."
    );
    let chatterbox = ChatterboxModel::load(
        &config.chatterbox_model_dir,
        config.onnx_threads,
        config.generation_settings(),
    )
    .context("Failed to load Chatterbox model")?;

    tracing::info!(
        load_ms = start_time.elapsed().as_millis(),
        "Models loaded successfully"
    );

    // 2. Instantiate repositories
    let diacritics_repo = Arc::new(PhonikudDiacriticsRepository::new(phonikud));
    let tts_repo = Arc::new(ChatterboxTtsRepository::new(chatterbox));
    let encoder_repo = Arc::new(FfmpegAudioEncoderRepository::new(config.ffmpeg_path.clone()));

    // 3. Instantiate service
    Ok(TtsService::new(
        diacritics_repo,
        tts_repo,
        encoder_repo,
        config.tts_settings(),
    ))
}
