use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use hyper::StatusCode;
use serde_json::json;

use super::RespBody;
use crate::error::{GuardError, Result};
use crate::security::DosProtection;

fn json_response(status: StatusCode, value: &serde_json::Value) -> Result<Response<RespBody>> {
    let body_bytes = serde_json::to_vec(value)
        .map_err(|e| GuardError::Http(format!("Failed to serialize response: {e}")))?;

    let body = Full::new(Bytes::from(body_bytes))
        .map_err(|never| match never {})
        .boxed();

    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .map_err(|e| GuardError::Http(format!("Failed to build response: {e}")))
}

/// Health check response - always returns 200 if process is running
pub fn health_check_response() -> Result<Response<RespBody>> {
    json_response(StatusCode::OK, &json!({"status": "healthy"}))
}

/// Tracked actors per rate limit category plus spam detection counters
pub fn stats_response(protection: &DosProtection) -> Result<Response<RespBody>> {
    let rate_limits: serde_json::Map<String, serde_json::Value> = protection
        .stats()
        .into_iter()
        .map(|(category, actors)| (category.to_string(), json!(actors)))
        .collect();

    json_response(
        StatusCode::OK,
        &json!({
            "rate_limits": rate_limits,
            "spam": protection.spam_stats(),
        }),
    )
}

pub fn not_found_response() -> Result<Response<RespBody>> {
    json_response(StatusCode::NOT_FOUND, &json!({"error": "not_found"}))
}
