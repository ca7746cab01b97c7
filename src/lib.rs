// ==========================================
// PR 评审人分配服务 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 团队/用户/PR 管理，评审人自动分配与重分配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问与工作单元
pub mod repository;

// 引擎层 - 评审人分配规则
pub mod engine;

// 配置层 - 进程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建库）
pub mod db;

// 日志系统
pub mod logging;

// 性能观测（SQL 计数/慢 SQL）
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与 HTTP 服务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{PrStatus, PullRequest, PullRequestShort, Statistics, Team, TeamMember, User};

// 引擎
pub use engine::{AssignmentEngine, DeactivationResult, RandomSource, ReviewerSelectionPolicy};

// API
pub use api::{ApiError, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "PR 评审人分配服务";
