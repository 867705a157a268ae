//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vasi_common::Platform;

/// API errors
#[derive(Debug)]
pub enum ApiError {
    UnknownPlatform(String),
}

impl ApiError {
    /// Parse a platform path segment
    pub fn platform(id: &str) -> Result<Platform, ApiError> {
        id.parse()
            .map_err(|_| ApiError::UnknownPlatform(id.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownPlatform(id) => {
                (StatusCode::NOT_FOUND, format!("Unknown platform: {}", id))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
