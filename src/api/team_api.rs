// ==========================================
// PR 评审人分配服务 - 团队 API
// ==========================================
// 职责: 团队创建/查询、团队批量停用
// 约束: 用户所属团队创建后不可变更
// ==========================================

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_field, validate_team_members};
use crate::domain::{Team, TeamMember, TeamWithMembers};
use crate::engine::{AssignmentEngine, DeactivationResult};
use crate::repository::{DirectoryStore, RepositoryError, UnitOfWork};

// ==========================================
// TeamApi - 团队 API
// ==========================================
pub struct TeamApi {
    uow: UnitOfWork,
    directory: Arc<dyn DirectoryStore>,
    engine: Arc<AssignmentEngine>,
}

impl TeamApi {
    pub fn new(
        uow: UnitOfWork,
        directory: Arc<dyn DirectoryStore>,
        engine: Arc<AssignmentEngine>,
    ) -> Self {
        Self {
            uow,
            directory,
            engine,
        }
    }

    /// 创建团队并写入成员
    ///
    /// # 返回
    /// - Err(INVALID_INPUT): 入参非法，或成员已属于其他团队
    /// - Err(TEAM_EXISTS): 团队名已存在
    #[instrument(skip(self, members), fields(team_name = %team_name, member_count = members.len()))]
    pub fn create_team(
        &self,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> ApiResult<TeamWithMembers> {
        require_field("team_name", team_name)?;
        validate_team_members(&members)?;

        let team = TeamWithMembers {
            team_name: team_name.to_string(),
            members,
        };

        self.uow.run(|tx| -> ApiResult<()> {
            if self.directory.team_exists(tx, team_name)? {
                return Err(ApiError::TeamExists(format!("团队 {} 已存在", team_name)));
            }

            for member in &team.members {
                match self.directory.get_user(tx, &member.user_id) {
                    Ok(existing) => {
                        return Err(ApiError::InvalidInput(format!(
                            "用户 {} 已属于团队 {}",
                            existing.user_id, existing.team_name
                        )))
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e.into()),
                }
            }

            let now = Utc::now();
            match self.directory.create_team(tx, &Team::new(team_name, now)) {
                Ok(()) => {}
                Err(RepositoryError::UniqueConstraintViolation(_)) => {
                    return Err(ApiError::TeamExists(format!("团队 {} 已存在", team_name)))
                }
                Err(e) => return Err(e.into()),
            }
            self.directory.upsert_users(tx, &team.to_users(now))?;
            Ok(())
        })?;

        info!("团队已创建");
        Ok(team)
    }

    /// 查询团队及成员
    pub fn get_team(&self, team_name: &str) -> ApiResult<TeamWithMembers> {
        require_field("team_name", team_name)?;

        self.uow.read(|tx| -> ApiResult<TeamWithMembers> {
            if !self.directory.team_exists(tx, team_name)? {
                return Err(ApiError::NotFound(format!("团队 {} 不存在", team_name)));
            }
            let members = self
                .directory
                .get_users_by_team(tx, team_name)?
                .iter()
                .map(TeamMember::from)
                .collect();
            Ok(TeamWithMembers {
                team_name: team_name.to_string(),
                members,
            })
        })
    }

    /// 停用团队全部成员并重分配评审
    pub fn deactivate_members(&self, team_name: &str) -> ApiResult<DeactivationResult> {
        require_field("team_name", team_name)?;
        Ok(self.engine.deactivate_team_members(team_name)?)
    }
}
