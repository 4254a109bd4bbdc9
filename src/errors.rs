use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the service.
///
/// `Provider` and `EmptyResult` are raised by the gateway clients and are
/// always contained at the call site inside the pipeline; they reach the
/// HTTP layer only if a handler talks to a backend directly.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("empty result: {0}")]
    EmptyResult(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Provider(err.to_string())
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Provider(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::EmptyResult(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
