// ==========================================
// PR 评审人分配服务 - 评审人分配引擎
// ==========================================
// 职责: PR 创建、合并、单个评审人替换
// 约定:
// - 每个操作在一个工作单元内完成，单元内读取看到同一快照
// - 业务规则失败 → 带错误码的 EngineError，整单元回滚
// - 存储失败 → EngineError::Repository，整单元回滚
// - *_in 变体加入调用方已开启的工作单元
// ==========================================

use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, instrument};

use crate::domain::{PullRequest, User, MAX_REVIEWERS};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::repositories::AssignmentRepositories;
use crate::engine::reviewer_policy::{RandomSource, ReplacementChoice, ReviewerSelectionPolicy};
use crate::perf::PerfGuard;
use crate::repository::{RepositoryError, TxContext};

/// 单个评审人替换结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

// ==========================================
// AssignmentEngine - 分配引擎
// ==========================================
pub struct AssignmentEngine {
    pub(crate) repos: AssignmentRepositories,
    pub(crate) policy: ReviewerSelectionPolicy,
    pub(crate) random: RandomSource,
}

impl AssignmentEngine {
    pub fn new(
        repos: AssignmentRepositories,
        policy: ReviewerSelectionPolicy,
        random: RandomSource,
    ) -> Self {
        Self {
            repos,
            policy,
            random,
        }
    }

    // ==========================================
    // CreatePullRequest
    // ==========================================

    /// 创建 PR 并自动分配至多 2 名评审人
    ///
    /// # 返回
    /// - `Err(PrExists)`: PR ID 已存在
    /// - `Err(NotFound)`: 作者不存在
    pub fn create_pull_request(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> EngineResult<PullRequest> {
        let _perf = PerfGuard::new("create_pull_request");
        self.repos.uow.run(|tx| {
            self.create_pull_request_in(tx, pull_request_id, pull_request_name, author_id)
        })
    }

    #[instrument(
        skip(self, tx, pull_request_name),
        fields(pull_request_id = %pull_request_id, author_id = %author_id)
    )]
    pub fn create_pull_request_in(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> EngineResult<PullRequest> {
        if self.repos.pull_requests.exists(tx, pull_request_id)? {
            return Err(EngineError::PrExists(pull_request_id.to_string()));
        }

        let author = self.load_user(tx, author_id)?;
        let pool = self
            .repos
            .directory
            .get_active_users_by_team(tx, &author.team_name)?;
        let exclude: HashSet<String> = HashSet::from([author.user_id.clone()]);
        let reviewers = self
            .random
            .with_rng(|rng| self.policy.select_reviewers(&pool, &exclude, MAX_REVIEWERS, rng));

        let pr = PullRequest::new_open(
            pull_request_id,
            pull_request_name,
            &author.user_id,
            reviewers,
            Utc::now(),
        );
        Self::ensure_invariants(&pr)?;

        match self.repos.pull_requests.create(tx, &pr) {
            Ok(()) => {}
            // 主键冲突等同于已存在
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(EngineError::PrExists(pull_request_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            team_name = %author.team_name,
            reviewers = ?pr.assigned_reviewers,
            candidate_pool = pool.len(),
            "PR 已创建并分配评审人"
        );
        Ok(pr)
    }

    // ==========================================
    // MergePullRequest
    // ==========================================

    /// 合并 PR（幂等：已合并时原样返回，不做修改）
    pub fn merge_pull_request(&self, pull_request_id: &str) -> EngineResult<PullRequest> {
        let _perf = PerfGuard::new("merge_pull_request");
        self.repos
            .uow
            .run(|tx| self.merge_pull_request_in(tx, pull_request_id))
    }

    #[instrument(skip(self, tx), fields(pull_request_id = %pull_request_id))]
    pub fn merge_pull_request_in(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
    ) -> EngineResult<PullRequest> {
        let mut pr = self.load_pull_request(tx, pull_request_id)?;

        if !pr.mark_merged(Utc::now()) {
            info!("PR 已是合并状态，忽略重复合并");
            return Ok(pr);
        }

        self.persist(tx, &mut pr)?;
        info!(merged_at = ?pr.merged_at, "PR 已合并");
        Ok(pr)
    }

    // ==========================================
    // ReassignReviewer
    // ==========================================

    /// 将 old_user_id 所在 slot 替换为同团队的另一名活跃用户
    ///
    /// # 返回
    /// - `Err(NotFound)`: PR 或用户不存在
    /// - `Err(PrMerged)`: PR 已合并
    /// - `Err(NotAssigned)`: old_user_id 不是该 PR 的评审人
    /// - `Err(NoCandidate)`: 团队内没有可用替换人
    pub fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> EngineResult<Reassignment> {
        let _perf = PerfGuard::new("reassign_reviewer");
        self.repos
            .uow
            .run(|tx| self.reassign_reviewer_in(tx, pull_request_id, old_user_id))
    }

    #[instrument(
        skip(self, tx),
        fields(pull_request_id = %pull_request_id, old_user_id = %old_user_id)
    )]
    pub fn reassign_reviewer_in(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> EngineResult<Reassignment> {
        let mut pr = self.load_pull_request(tx, pull_request_id)?;

        if !pr.status.allows_reviewer_change() {
            return Err(EngineError::PrMerged(pull_request_id.to_string()));
        }

        let slot = pr
            .reviewer_slot(old_user_id)
            .ok_or_else(|| EngineError::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: old_user_id.to_string(),
            })?;

        let old_reviewer = self.load_user(tx, old_user_id)?;

        let replaced_by = match self.choose_replacement(tx, &pr, &old_reviewer.team_name)? {
            ReplacementChoice::Selected(user_id) => user_id,
            ReplacementChoice::NoCandidate => {
                return Err(EngineError::NoCandidate {
                    pull_request_id: pull_request_id.to_string(),
                    team_name: old_reviewer.team_name,
                })
            }
        };

        pr.replace_reviewer(slot, replaced_by.clone());
        self.persist(tx, &mut pr)?;

        info!(slot, replaced_by = %replaced_by, "评审人已替换");
        Ok(Reassignment {
            pull_request: pr,
            replaced_by,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 加载用户，不存在时返回 NOT_FOUND
    pub(crate) fn load_user(&self, tx: &TxContext<'_>, user_id: &str) -> EngineResult<User> {
        match self.repos.directory.get_user(tx, user_id) {
            Ok(user) => Ok(user),
            Err(e) if e.is_not_found() => Err(EngineError::not_found("User", user_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// 加载 PR，不存在时返回 NOT_FOUND
    pub(crate) fn load_pull_request(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
    ) -> EngineResult<PullRequest> {
        self.repos
            .pull_requests
            .get_by_id(tx, pull_request_id)?
            .ok_or_else(|| EngineError::not_found("PullRequest", pull_request_id))
    }

    /// 在团队活跃成员中为 PR 选择一名替换人（排除作者与全部现任评审人）
    pub(crate) fn choose_replacement(
        &self,
        tx: &TxContext<'_>,
        pr: &PullRequest,
        team_name: &str,
    ) -> EngineResult<ReplacementChoice> {
        let pool = self.repos.directory.get_active_users_by_team(tx, team_name)?;
        let exclude = pr.excluded_participants();
        Ok(self
            .random
            .with_rng(|rng| self.policy.select_replacement(&pool, &exclude, rng)))
    }

    /// 校验不变量后按 revision 条件写回，并刷新内存中的 revision
    pub(crate) fn persist(&self, tx: &TxContext<'_>, pr: &mut PullRequest) -> EngineResult<()> {
        Self::ensure_invariants(pr)?;
        pr.revision = self.repos.pull_requests.update(tx, pr)?;
        Ok(())
    }

    fn ensure_invariants(pr: &PullRequest) -> EngineResult<()> {
        pr.check_invariants().map_err(EngineError::InvariantViolation)
    }
}
