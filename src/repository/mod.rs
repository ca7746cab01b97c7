// ==========================================
// PR 评审人分配服务 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口与工作单元,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod contracts;
pub mod directory_repo;
pub mod error;
pub mod pull_request_repo;
pub mod statistics_repo;
pub mod unit_of_work;

// 重导出核心仓储
pub use contracts::{DirectoryStore, PullRequestStore};
pub use directory_repo::DirectoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use pull_request_repo::PullRequestRepository;
pub use statistics_repo::StatisticsRepository;
pub use unit_of_work::{TxContext, UnitOfWork};
