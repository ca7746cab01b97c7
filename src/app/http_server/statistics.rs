use axum::extract::{Json, State};
use std::sync::Arc;

use super::common::run_blocking;
use crate::api::dto::HealthResponse;
use crate::api::error::ApiResult;
use crate::app::state::AppState;
use crate::domain::Statistics;

/// GET /health
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /statistics
pub(super) async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Statistics>> {
    let api = state.statistics_api.clone();
    let stats = run_blocking(move || api.get_statistics()).await?;
    Ok(Json(stats))
}
