use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::dto::{ErrorBody, ErrorResponse};
use crate::api::error::{ApiError, ApiResult};

// ==========================================
// 公共工具：错误映射、请求体解析、阻塞任务
// ==========================================

/// 错误码 → HTTP 状态码
pub(crate) fn status_for(err: &ApiError) -> StatusCode {
    match err.code() {
        "TEAM_EXISTS" | "PR_EXISTS" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
        "PR_MERGED" | "NOT_ASSIGNED" | "NO_CANDIDATE" => StatusCode::CONFLICT,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = if self.is_domain() {
            self.to_string()
        } else {
            // 基础设施细节只进日志
            tracing::error!(error = %self, "请求处理失败");
            "服务器内部错误".to_string()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// 解析 JSON 请求体，格式错误统一为 INVALID_INPUT
pub(super) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::InvalidInput(format!("请求体格式错误: {}", e.body_text())))
}

/// 解析查询参数，格式错误统一为 INVALID_INPUT
pub(super) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::InvalidInput(format!("查询参数错误: {}", e.body_text())))
}

/// 在阻塞线程池中执行同步 API 调用
pub(super) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务执行失败: {}", e)))?
}
