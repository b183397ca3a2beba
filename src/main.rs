use std::sync::Arc;
use hebrew_tts_backend::infrastructure::bootstrap::{build_tts_service, init_logging};
use hebrew_tts_backend::infrastructure::config::Config;
use hebrew_tts_backend::infrastructure::http::start_http_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Hebrew TTS Backend on {}:{}",
        config.host,
        config.port
    );

    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set, POST /tts is open to anyone who can reach the server");
    }

    // Model loading blocks for several seconds
    let tts_service = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_tts_service(&config)).await??
    };

    start_http_server(Arc::new(config), Arc::new(tts_service)).await?;

    Ok(())
}
