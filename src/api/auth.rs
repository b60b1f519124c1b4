use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use super::models::failure;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects any request whose `x-api-key` does not match the configured key.
pub async fn require_api_key(
    State(api_key): State<Arc<String>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = check_api_key(request.headers(), &api_key) {
        warn!("Rejected request to {}", request.uri().path());
        return rejection;
    }

    next.run(request).await
}

fn check_api_key(headers: &HeaderMap, expected: &str) -> Result<(), Response> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().trim_matches('"'))
        .unwrap_or_default();

    if provided.is_empty() {
        return Err(failure(StatusCode::UNAUTHORIZED, "x-api-key is missing"));
    }
    if provided != expected {
        return Err(failure(StatusCode::UNAUTHORIZED, "x-api-key is invalid"));
    }

    Ok(())
}
