// ==========================================
// PR 评审人分配服务 - 用户 API
// ==========================================
// 职责: 单个用户活跃状态切换、用户评审列表查询
// ==========================================

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_field;
use crate::domain::{PullRequestShort, User};
use crate::repository::{DirectoryStore, PullRequestStore, RepositoryError, UnitOfWork};

pub struct UserApi {
    uow: UnitOfWork,
    directory: Arc<dyn DirectoryStore>,
    pull_requests: Arc<dyn PullRequestStore>,
}

fn user_not_found(user_id: &str) -> impl FnOnce(RepositoryError) -> ApiError + '_ {
    move |e| {
        if e.is_not_found() {
            ApiError::NotFound(format!("用户 {} 不存在", user_id))
        } else {
            e.into()
        }
    }
}

impl UserApi {
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

    /// 设置用户活跃状态（不触发评审人重分配）
    ///
    /// # 返回
    /// - Ok(User): 更新后的用户
    /// - Err(NOT_FOUND): 用户不存在
    pub fn set_is_active(&self, user_id: &str, is_active: bool) -> ApiResult<User> {
        require_field("user_id", user_id)?;

        let user = self.uow.run(|tx| -> ApiResult<User> {
            let mut user = self
                .directory
                .get_user(tx, user_id)
                .map_err(user_not_found(user_id))?;
            if user.set_active(is_active, Utc::now()) {
                self.directory.update_user(tx, &user)?;
            }
            Ok(user)
        })?;

        info!(user_id = %user.user_id, is_active = user.is_active, "用户活跃状态已更新");
        Ok(user)
    }

    /// 查询用户担任评审人的 PR
    pub fn get_reviews(&self, user_id: &str) -> ApiResult<Vec<PullRequestShort>> {
        require_field("user_id", user_id)?;

        self.uow.read(|tx| -> ApiResult<Vec<PullRequestShort>> {
            self.directory
                .get_user(tx, user_id)
                .map_err(user_not_found(user_id))?;
            Ok(self.pull_requests.list_by_reviewer(tx, user_id)?)
        })
    }
}
