// ==========================================
// PR 评审人分配服务 - API 层
// ==========================================
// 职责: 入参校验、错误分类、用例门面，供 HTTP 层调用
// ==========================================

pub mod dto;
pub mod error;
pub mod pull_request_api;
pub mod statistics_api;
pub mod team_api;
pub mod user_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pull_request_api::PullRequestApi;
pub use statistics_api::StatisticsApi;
pub use team_api::TeamApi;
pub use user_api::UserApi;
