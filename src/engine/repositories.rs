// ==========================================
// PR 评审人分配服务 - 引擎层存储聚合
// ==========================================
// 职责: 聚合分配引擎所需的存储契约与工作单元
// ==========================================

use std::sync::Arc;

use crate::repository::{
    DirectoryRepository, DirectoryStore, PullRequestRepository, PullRequestStore, UnitOfWork,
};

/// 分配引擎存储集合
///
/// 存储以 trait 对象持有，测试时可整体替换为故障注入实现。
#[derive(Clone)]
pub struct AssignmentRepositories {
    /// 工作单元
    pub uow: UnitOfWork,
    /// 团队/用户目录
    pub directory: Arc<dyn DirectoryStore>,
    /// Pull Request 存储
    pub pull_requests: Arc<dyn PullRequestStore>,
}

impl AssignmentRepositories {
    pub fn new(
        uow: UnitOfWork,
        directory: Arc<dyn DirectoryStore>,
        pull_requests: Arc<dyn PullRequestStore>,
    ) -> Self {
        Self {
            uow,
            directory,
            pull_requests,
        }
    }

    /// 基于 SQLite 实现构建
    pub fn sqlite(db_path: &str) -> Self {
        Self::new(
            UnitOfWork::new(db_path),
            Arc::new(DirectoryRepository::new()),
            Arc::new(PullRequestRepository::new()),
        )
    }
}
