use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::domain::tts::TtsService;
use crate::infrastructure::config::Config;
use crate::{
    controllers::{health, tts::TtsController},
    infrastructure::auth::{api_key_middleware, make_request_span, request_id_middleware},
};

/// Build the application router with all routes and layers configured
pub fn create_router(config: Arc<Config>, tts_service: Arc<TtsService>) -> Router {
    let tts_controller = Arc::new(TtsController::new(tts_service.clone()));

    // TTS routes (API key when configured)
    let tts_routes = Router::new()
        .route("/tts", post(TtsController::synthesize))
        .with_state(tts_controller)
        .route_layer(middleware::from_fn_with_state(
            config.clone(),
            api_key_middleware,
        ));

    // Health routes (public)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(tts_service);

    // Demo page and its assets
    let web = ServeDir::new(&config.web_dir);
    let index = ServeFile::new(config.web_dir.join("index.html"));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route_service("/", index)
        .merge(health_routes)
        .merge(tts_routes)
        .fallback_service(web)
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    tts_service: Arc<TtsService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(config.clone(), tts_service);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
