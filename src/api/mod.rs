//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the notification feed, current platform
//! rankings, and monitor control to UI collaborators.

pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/notifications", get(routes::notifications::list))
        .route("/api/notifications/clear", post(routes::notifications::clear))
        .route("/api/rankings", get(routes::rankings::list))
        .route("/api/rankings/:platform", get(routes::rankings::detail))
        .route("/api/monitor/status", get(routes::monitor::status))
        .route("/api/monitor/start", post(routes::monitor::start))
        .route("/api/monitor/stop", post(routes::monitor::stop))
        .route("/api/monitor/check", post(routes::monitor::check))
        .with_state(state)
}
