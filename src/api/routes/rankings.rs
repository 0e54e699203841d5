use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{PlatformSnapshot, RankedList};

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub rankings: RankedList,
}

/// The current leaderboard (empty until the first successful cycle).
pub async fn list(State(state): State<AppState>) -> Json<RankingsResponse> {
    let rankings = state.monitor.rankings().await;
    Json(RankingsResponse { rankings })
}

/// Snapshot detail for a single platform.
pub async fn detail(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<PlatformSnapshot>, ApiError> {
    let rankings = state.monitor.rankings().await;
    rankings
        .get(&platform)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No ranking for platform '{}'", platform)))
}
