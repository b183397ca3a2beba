//! Serverless job handling.
//!
//! A job input is the same JSON object POST /tts accepts; the output is the
//! same response object, or `{"error": "..."}`.

pub mod runpod;

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::time::Instant;

use crate::domain::tts::{TtsRequest, TtsServiceApi};

pub use runpod::{RunpodConfig, RunpodWorker};

/// Run one synthesis job and build its output payload
pub async fn handle_job<S>(service: &S, input: Value) -> Value
where
    S: TtsServiceApi + ?Sized,
{
    let start_time = Instant::now();

    // A job without input gets every request default
    let input = match input {
        Value::Null => json!({}),
        other => other,
    };

    let request: TtsRequest = match serde_json::from_value(input) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected job with invalid input");
            return json!({ "error": format!("Invalid input: {}", e) });
        }
    };

    match service.synthesize(request).await {
        Ok(result) => {
            tracing::info!(
                audio_size = result.audio_data.len(),
                latency_ms = start_time.elapsed().as_millis(),
                "Job completed"
            );
            json!({
                "audio_base64": general_purpose::STANDARD.encode(&result.audio_data),
                "processed_text": result.processed_text,
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Job failed");
            json!({ "error": e.to_string() })
        }
    }
}
