use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use std::sync::Arc;

use super::common::{json_body, query_params, run_blocking};
use crate::api::dto::{SetIsActiveRequest, UserDto, UserQuery, UserResponse, UserReviewsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;

// ==========================================
// 用户相关路由
// ==========================================

/// POST /users/setIsActive（管理员）
pub(super) async fn set_is_active(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let req = json_body(payload)?;
    let is_active = req
        .is_active
        .ok_or_else(|| ApiError::InvalidInput("is_active 不能为空".to_string()))?;

    let api = state.user_api.clone();
    let user = run_blocking(move || api.set_is_active(&req.user_id, is_active)).await?;
    Ok(Json(UserResponse {
        user: UserDto::from(&user),
    }))
}

/// GET /users/getReview?user_id=
pub(super) async fn get_review(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<UserReviewsResponse>> {
    let query = query_params(query)?;
    let api = state.user_api.clone();
    let user_id = query.user_id.clone();
    let pull_requests = run_blocking(move || api.get_reviews(&query.user_id)).await?;
    Ok(Json(UserReviewsResponse {
        user_id,
        pull_requests,
    }))
}
