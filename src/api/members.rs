//! Member API endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};

use super::{parse_payload, ApiResult};
use crate::models::{
    IncrementRequest, LeaderboardResponse, MemberRecord, MessageResponse, SetRequest,
};
use crate::AppState;

/// GET /{name} - Get a member's points and completed tasks.
pub async fn get_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<MemberRecord> {
    Ok(Json(state.service.fetch(&name).await?))
}

/// POST /{name} - Add points and record a completed task.
pub async fn add_points(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<MemberRecord> {
    let request: IncrementRequest = parse_payload(&body)?;
    Ok(Json(state.service.increment(&name, request).await?))
}

/// PUT /{name} - Set points and the task list to exact values.
pub async fn set_points(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<MemberRecord> {
    let request: SetRequest = parse_payload(&body)?;
    Ok(Json(state.service.set(&name, request).await?))
}

/// DELETE /{name}/delete - Remove a member.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<MessageResponse> {
    state.service.delete(&name).await?;
    Ok(Json(MessageResponse {
        message: format!("{} has been deleted", name),
    }))
}

/// GET /leaderboard - All members by points, highest first.
pub async fn leaderboard(State(state): State<AppState>) -> ApiResult<LeaderboardResponse> {
    let leaderboard = state.service.leaderboard().await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}
