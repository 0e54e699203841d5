use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::models::Notification;
use crate::monitor::MonitorStatus;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub monitor: MonitorStatus,

    /// The toast currently displayed, if it has not expired
    pub active_toast: Option<Notification>,
}

async fn status_response(state: &AppState) -> StatusResponse {
    StatusResponse {
        monitor: state.monitor.status().await,
        active_toast: state.sink.active_toast().await,
    }
}

/// Monitor state plus the active toast.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(status_response(&state).await)
}

/// Start polling. 202 when newly started, 200 when already running.
pub async fn start(State(state): State<AppState>) -> impl IntoResponse {
    let already_running = state.monitor.is_running().await;
    state.monitor.clone().start().await;

    let code = if already_running {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };
    (code, Json(status_response(&state).await))
}

/// Stop polling. No-op when already stopped.
pub async fn stop(State(state): State<AppState>) -> Json<StatusResponse> {
    state.monitor.stop().await;
    Json(status_response(&state).await)
}

/// Run one cycle immediately without altering the schedule.
pub async fn check(State(state): State<AppState>) -> Json<StatusResponse> {
    state.monitor.force_check().await;
    Json(status_response(&state).await)
}
