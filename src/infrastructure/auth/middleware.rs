use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::infrastructure::config::Config;

pub const X_API_KEY: &str = "x-api-key";

/// API key middleware, a no-op when no key is configured
pub async fn api_key_middleware(
    State(config): State<Arc<Config>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = extract_api_key(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing API key".to_string()))?;

    if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(AppError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}

/// Key from `Authorization: Bearer <key>` or `x-api-key: <key>`
fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    bearer.or_else(|| headers.get(X_API_KEY).and_then(|v| v.to_str().ok()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
