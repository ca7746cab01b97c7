// ==========================================
// PR 评审人分配服务 - HTTP 服务
// ==========================================
// 职责: 路由装配、中间件、监听与优雅退出
// 路由:
// - 公共: /health /statistics /team/add /team/get /users/getReview
//         /pullRequest/create /pullRequest/merge /pullRequest/reassign
// - 管理员（Bearer 令牌）: /team/deactivateMembers /users/setIsActive
// ==========================================

mod auth;
mod common;
mod pull_request;
mod request_log;
mod statistics;
mod team;
mod user;

use anyhow::Context;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;

pub use auth::admin_auth;
pub use request_log::REQUEST_ID_HEADER;

/// 构建路由
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/team/deactivateMembers", post(team::deactivate_members))
        .route("/users/setIsActive", post(user::set_is_active))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/health", get(statistics::health))
        .route("/statistics", get(statistics::get_statistics))
        .route("/team/add", post(team::add_team))
        .route("/team/get", get(team::get_team))
        .route("/users/getReview", get(user::get_review))
        .route("/pullRequest/create", post(pull_request::create_pull_request))
        .route("/pullRequest/merge", post(pull_request::merge_pull_request))
        .route("/pullRequest/reassign", post(pull_request::reassign_reviewer))
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_log::request_log)),
        )
        .with_state(state)
}

/// 监听 0.0.0.0:http_port 并服务，直到收到退出信号
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;

    tracing::info!(addr = %addr, "HTTP 服务已启动");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

/// Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "无法监听 Ctrl-C 信号");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "无法监听 SIGTERM 信号");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到退出信号，开始优雅退出");
}
