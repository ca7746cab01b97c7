// ==========================================
// PR 评审人分配服务 - 主入口
// ==========================================
// 流程: 加载配置 → 初始化日志 → 建库 → 装配 AppState → 启动 HTTP 服务
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use pr_reviewer_service::app::{serve, AppState};
use pr_reviewer_service::config::AppConfig;
use pr_reviewer_service::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("加载配置失败")?;

    // 初始化日志系统
    logging::init(&config.log_level, config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{}", pr_reviewer_service::APP_NAME);
    tracing::info!("系统版本: {}", pr_reviewer_service::VERSION);
    tracing::info!("==================================================");
    tracing::info!(
        http_port = config.http_port,
        db_path = %config.db_path,
        log_format = %config.log_format,
        "配置已加载"
    );

    // 建库与 AppState 装配为同步 IO，放到阻塞线程执行
    let app_state = tokio::task::spawn_blocking(move || AppState::new(config))
        .await
        .context("AppState 初始化任务失败")?
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    tracing::info!("AppState初始化成功");

    serve(Arc::new(app_state)).await
}
