use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::models::Notification;

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// The bounded notification history, most recent first.
pub async fn list(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let notifications = state.sink.history().await;
    Json(NotificationsResponse { notifications })
}

/// Empty the history. The active toast is unaffected.
pub async fn clear(State(state): State<AppState>) -> StatusCode {
    state.sink.clear().await;
    StatusCode::NO_CONTENT
}
