// ==========================================
// PR 评审人分配服务 - 仓储契约 (Trait)
// ==========================================
// 职责: 引擎依赖的存储抽象，便于替换实现与测试注入
// 约定: 所有方法显式接收 &TxContext，在调用方的工作单元内执行
// ==========================================

use crate::domain::{PullRequest, PullRequestShort, Team, User};
use crate::repository::error::RepositoryResult;
use crate::repository::unit_of_work::TxContext;

/// 团队/用户目录存储
pub trait DirectoryStore: Send + Sync {
    /// 团队是否存在
    fn team_exists(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<bool>;

    /// 创建团队（重名时返回唯一约束错误）
    fn create_team(&self, tx: &TxContext<'_>, team: &Team) -> RepositoryResult<()>;

    /// 查询团队
    ///
    /// # 返回
    /// - `Err(RepositoryError::NotFound)`: 团队不存在
    fn get_team(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<Team>;

    /// 查询用户
    ///
    /// # 返回
    /// - `Err(RepositoryError::NotFound)`: 用户不存在
    fn get_user(&self, tx: &TxContext<'_>, user_id: &str) -> RepositoryResult<User>;

    /// 团队全部成员（按用户名排序）
    fn get_users_by_team(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<Vec<User>>;

    /// 团队活跃成员（按 user_id 排序）
    fn get_active_users_by_team(
        &self,
        tx: &TxContext<'_>,
        team_name: &str,
    ) -> RepositoryResult<Vec<User>>;

    /// 批量插入或更新用户（用户名、活跃标记）
    fn upsert_users(&self, tx: &TxContext<'_>, users: &[User]) -> RepositoryResult<()>;

    /// 更新单个用户
    ///
    /// # 返回
    /// - `Err(RepositoryError::NotFound)`: 用户不存在
    fn update_user(&self, tx: &TxContext<'_>, user: &User) -> RepositoryResult<()>;
}

/// Pull Request 存储
pub trait PullRequestStore: Send + Sync {
    /// PR 是否存在
    fn exists(&self, tx: &TxContext<'_>, pull_request_id: &str) -> RepositoryResult<bool>;

    /// 新建 PR（含评审人）
    fn create(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<()>;

    /// 按 (id, revision) 条件更新 PR，成功后返回新的 revision
    ///
    /// # 返回
    /// - `Err(RepositoryError::NotFound)`: PR 不存在
    /// - `Err(RepositoryError::OptimisticLockFailure)`: revision 已被其他单元修改
    fn update(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<i64>;

    /// 按 ID 查询 PR
    ///
    /// # 返回
    /// - `Ok(None)`: PR 不存在
    fn get_by_id(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
    ) -> RepositoryResult<Option<PullRequest>>;

    /// 某用户担任评审人的全部 OPEN 状态 PR
    fn get_open_by_reviewer(
        &self,
        tx: &TxContext<'_>,
        user_id: &str,
    ) -> RepositoryResult<Vec<PullRequest>>;

    /// 某用户担任评审人的全部 PR 简要信息（任意状态，按创建时间倒序）
    fn list_by_reviewer(
        &self,
        tx: &TxContext<'_>,
        user_id: &str,
    ) -> RepositoryResult<Vec<PullRequestShort>>;
}
