// ==========================================
// PR 评审人分配服务 - 应用状态
// ==========================================
// 职责: 初始化数据库，装配仓储、引擎与 API 实例
// ==========================================

use std::sync::Arc;

use crate::api::{PullRequestApi, StatisticsApi, TeamApi, UserApi};
use crate::config::AppConfig;
use crate::db::{open_sqlite_connection, run_migrations};
use crate::engine::{
    AssignmentEngine, AssignmentRepositories, RandomSource, ReviewerSelectionPolicy,
};
use crate::repository::StatisticsRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源，HTTP 层以 Arc<AppState> 共享
pub struct AppState {
    /// 进程配置
    pub config: AppConfig,

    /// 分配引擎
    pub engine: Arc<AssignmentEngine>,

    /// PR API
    pub pull_request_api: Arc<PullRequestApi>,

    /// 团队 API
    pub team_api: Arc<TeamApi>,

    /// 用户 API
    pub user_api: Arc<UserApi>,

    /// 统计 API
    pub statistics_api: Arc<StatisticsApi>,
}

impl AppState {
    /// 创建新的AppState实例（线程本地随机源）
    ///
    /// # 参数
    /// - config: 进程配置（db_path 指向的库会在此执行建库）
    pub fn new(config: AppConfig) -> Result<Self, String> {
        Self::with_random_source(config, RandomSource::thread_local())
    }

    /// 使用指定随机源创建（测试中用固定种子复现评审人选择）
    pub fn with_random_source(config: AppConfig, random: RandomSource) -> Result<Self, String> {
        tracing::info!(db_path = %config.db_path, "初始化 AppState");

        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库 {}: {}", config.db_path, e))?;
        let schema_version =
            run_migrations(&conn).map_err(|e| format!("数据库建库失败: {}", e))?;
        drop(conn);
        tracing::info!(schema_version, "数据库就绪");

        let repos = AssignmentRepositories::sqlite(&config.db_path);
        let uow = repos.uow.clone();
        let directory = repos.directory.clone();
        let pull_requests = repos.pull_requests.clone();

        let engine = Arc::new(AssignmentEngine::new(
            repos,
            ReviewerSelectionPolicy::new(),
            random,
        ));

        Ok(Self {
            pull_request_api: Arc::new(PullRequestApi::new(engine.clone())),
            team_api: Arc::new(TeamApi::new(uow.clone(), directory.clone(), engine.clone())),
            user_api: Arc::new(UserApi::new(uow.clone(), directory, pull_requests)),
            statistics_api: Arc::new(StatisticsApi::new(uow, StatisticsRepository::new())),
            engine,
            config,
        })
    }
}

/// 默认数据库路径：<data_dir>/pr-reviewer-service/pr_reviewer.db
///
/// 无法获取用户数据目录时退回当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    let mut path = PathBuf::from("./pr_reviewer.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pr-reviewer-service");
        // 确保目录存在
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("pr_reviewer.db");
        }
    }

    path.to_string_lossy().to_string()
}
