use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use super::common::{json_body, query_params, run_blocking};
use crate::api::dto::{
    CreateTeamRequest, DeactivateMembersRequest, DeactivateMembersResponse, TeamQuery, TeamResponse,
};
use crate::api::error::ApiResult;
use crate::app::state::AppState;
use crate::domain::TeamWithMembers;

// ==========================================
// 团队相关路由
// ==========================================

/// POST /team/add
pub(super) async fn add_team(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let req = json_body(payload)?;
    let api = state.team_api.clone();
    let team = run_blocking(move || api.create_team(&req.team_name, req.members)).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=
pub(super) async fn get_team(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamWithMembers>> {
    let query = query_params(query)?;
    let api = state.team_api.clone();
    let team = run_blocking(move || api.get_team(&query.team_name)).await?;
    Ok(Json(team))
}

/// POST /team/deactivateMembers（管理员）
pub(super) async fn deactivate_members(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeactivateMembersRequest>, JsonRejection>,
) -> ApiResult<Json<DeactivateMembersResponse>> {
    let req = json_body(payload)?;
    let api = state.team_api.clone();
    let result = run_blocking(move || api.deactivate_members(&req.team_name)).await?;
    Ok(Json(DeactivateMembersResponse::from(&result)))
}
