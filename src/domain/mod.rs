// ==========================================
// PR 评审人分配服务 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、评审人不变量
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod pull_request;
pub mod statistics;
pub mod team;
pub mod types;
pub mod user;

// 重导出核心类型
pub use pull_request::{PullRequest, PullRequestShort, MAX_REVIEWERS};
pub use statistics::Statistics;
pub use team::{Team, TeamMember, TeamWithMembers};
pub use types::PrStatus;
pub use user::User;
