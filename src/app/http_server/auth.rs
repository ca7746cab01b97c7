use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::app::state::AppState;

// ==========================================
// 管理员鉴权中间件
// ==========================================
// 要求: Authorization: Bearer <ADMIN_TOKEN>
// ==========================================

const BEARER_PREFIX: &str = "Bearer ";

/// 校验 Authorization 头，失败返回 401 UNAUTHORIZED
pub async fn admin_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
    {
        None => Err("missing or invalid authorization header"),
        Some(token) if token == state.config.admin_token => Ok(()),
        Some(_) => Err("invalid admin token"),
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::warn!(path = %request.uri().path(), reason, "管理员鉴权失败");
            ApiError::Unauthorized(reason.to_string()).into_response()
        }
    }
}
