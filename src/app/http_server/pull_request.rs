use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use std::sync::Arc;

use super::common::{json_body, run_blocking};
use crate::api::dto::{
    CreatePullRequestRequest, MergePullRequestRequest, PullRequestDto, PullRequestResponse,
    ReassignReviewerRequest, ReassignReviewerResponse,
};
use crate::api::error::ApiResult;
use crate::app::state::AppState;

// ==========================================
// Pull Request 相关路由
// ==========================================

/// POST /pullRequest/create
pub(super) async fn create_pull_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let req = json_body(payload)?;
    let api = state.pull_request_api.clone();
    let pr = run_blocking(move || {
        api.create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse {
            pr: PullRequestDto::from(&pr),
        }),
    ))
}

/// POST /pullRequest/merge（幂等）
pub(super) async fn merge_pull_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let req = json_body(payload)?;
    let api = state.pull_request_api.clone();
    let pr = run_blocking(move || api.merge_pull_request(&req.pull_request_id)).await?;
    Ok(Json(PullRequestResponse {
        pr: PullRequestDto::from(&pr),
    }))
}

/// POST /pullRequest/reassign
pub(super) async fn reassign_reviewer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignReviewerResponse>> {
    let req = json_body(payload)?;
    let api = state.pull_request_api.clone();
    let reassignment =
        run_blocking(move || api.reassign_reviewer(&req.pull_request_id, &req.old_user_id)).await?;
    Ok(Json(ReassignReviewerResponse {
        pr: PullRequestDto::from(&reassignment.pull_request),
        replaced_by: reassignment.replaced_by,
    }))
}
