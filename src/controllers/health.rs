use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::tts::{TtsService, TtsServiceApi};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Models are loaded before the server binds, so readiness only depends on the encoder
pub async fn health_ready(State(tts_service): State<Arc<TtsService>>) -> impl IntoResponse {
    match tts_service.check_encoder().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "models": "loaded",
                "encoder": "available"
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Audio encoder health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "models": "loaded",
                    "encoder": "unavailable"
                })),
            )
        }
    }
}
