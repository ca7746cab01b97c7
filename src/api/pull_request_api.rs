// ==========================================
// PR 评审人分配服务 - Pull Request API
// ==========================================
// 职责: 入参校验 + 调用分配引擎 + 错误分类
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::validator::require_field;
use crate::domain::PullRequest;
use crate::engine::{AssignmentEngine, Reassignment};

/// Pull Request API
///
/// 职责：
/// 1. 创建 PR（自动分配评审人）
/// 2. 合并 PR（幂等）
/// 3. 替换评审人
pub struct PullRequestApi {
    engine: Arc<AssignmentEngine>,
}

impl PullRequestApi {
    pub fn new(engine: Arc<AssignmentEngine>) -> Self {
        Self { engine }
    }

    /// 创建 PR
    ///
    /// # 返回
    /// - Err(INVALID_INPUT): 必填字段为空
    /// - Err(PR_EXISTS) / Err(NOT_FOUND): 引擎业务错误
    pub fn create_pull_request(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> ApiResult<PullRequest> {
        require_field("pull_request_id", pull_request_id)?;
        require_field("pull_request_name", pull_request_name)?;
        require_field("author_id", author_id)?;

        Ok(self
            .engine
            .create_pull_request(pull_request_id, pull_request_name, author_id)?)
    }

    /// 合并 PR
    pub fn merge_pull_request(&self, pull_request_id: &str) -> ApiResult<PullRequest> {
        require_field("pull_request_id", pull_request_id)?;
        Ok(self.engine.merge_pull_request(pull_request_id)?)
    }

    /// 替换评审人
    pub fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> ApiResult<Reassignment> {
        require_field("pull_request_id", pull_request_id)?;
        require_field("old_user_id", old_user_id)?;
        Ok(self.engine.reassign_reviewer(pull_request_id, old_user_id)?)
    }
}
