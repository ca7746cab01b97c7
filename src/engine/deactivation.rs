// ==========================================
// PR 评审人分配服务 - 团队批量停用
// ==========================================
// 流程（单个工作单元）:
// 1. 团队不存在 → NOT_FOUND
// 2. 停用团队内全部活跃成员
// 3. 对每个被停用用户担任评审人的 OPEN PR，在同团队活跃成员中选替换人
// 4. 无候选人 → 移除该 slot；其他单 PR 失败 → 回滚到保存点、记录告警并跳过
// ==========================================

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

use crate::domain::PullRequest;
use crate::engine::assignment::AssignmentEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reviewer_policy::ReplacementChoice;
use crate::perf::PerfGuard;
use crate::repository::TxContext;

/// 批量停用结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeactivationResult {
    pub team_name: String,
    /// 本次被停用的用户数
    pub deactivated_count: usize,
    /// 成功调整评审人的 PR 数（替换或移除 slot，每个 PR 计一次）
    pub reassigned_count: usize,
    /// 本次被停用的用户 ID
    pub user_ids: Vec<String>,
    /// 因无候选人而移除的 slot 数
    pub removed_slots: usize,
    /// 因存储失败被跳过的 PR（保持原评审人）
    pub skipped_pull_requests: Vec<String>,
}

/// 单个 PR 的 slot 处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotOutcome {
    Replaced(String),
    Removed,
    Unchanged,
}

impl AssignmentEngine {
    /// 停用团队全部活跃成员并重分配其评审中的 OPEN PR
    pub fn deactivate_team_members(&self, team_name: &str) -> EngineResult<DeactivationResult> {
        let _perf = PerfGuard::new("deactivate_team_members");
        self.repos
            .uow
            .run(|tx| self.deactivate_team_members_in(tx, team_name))
    }

    #[instrument(skip(self, tx), fields(team_name = %team_name))]
    pub fn deactivate_team_members_in(
        &self,
        tx: &TxContext<'_>,
        team_name: &str,
    ) -> EngineResult<DeactivationResult> {
        if !self.repos.directory.team_exists(tx, team_name)? {
            return Err(EngineError::not_found("Team", team_name));
        }

        let now = Utc::now();
        let mut result = DeactivationResult {
            team_name: team_name.to_string(),
            ..Default::default()
        };

        for mut user in self.repos.directory.get_users_by_team(tx, team_name)? {
            if user.set_active(false, now) {
                self.repos.directory.update_user(tx, &user)?;
                result.user_ids.push(user.user_id);
            }
        }
        result.deactivated_count = result.user_ids.len();

        let mut reassigned: BTreeSet<String> = BTreeSet::new();
        let mut skipped: BTreeSet<String> = BTreeSet::new();

        for user_id in &result.user_ids {
            // 每个用户重新查询，保证看到前一轮写入后的评审人列表
            let open_prs = self.repos.pull_requests.get_open_by_reviewer(tx, user_id)?;

            for pr in open_prs {
                let pull_request_id = pr.pull_request_id.clone();
                let outcome = tx.savepoint(|sp| {
                    self.replace_deactivated_reviewer(sp, pr, user_id, team_name)
                });

                match outcome {
                    Ok(SlotOutcome::Replaced(new_reviewer)) => {
                        info!(
                            pull_request_id = %pull_request_id,
                            old_user_id = %user_id,
                            new_user_id = %new_reviewer,
                            "停用成员的评审 slot 已替换"
                        );
                        reassigned.insert(pull_request_id);
                    }
                    Ok(SlotOutcome::Removed) => {
                        info!(
                            pull_request_id = %pull_request_id,
                            old_user_id = %user_id,
                            "无可用候选人，已移除评审 slot"
                        );
                        result.removed_slots += 1;
                        reassigned.insert(pull_request_id);
                    }
                    Ok(SlotOutcome::Unchanged) => {}
                    Err(err) => {
                        warn!(
                            pull_request_id = %pull_request_id,
                            user_id = %user_id,
                            error = %err,
                            "PR 评审人重分配失败，已跳过并保持原评审人"
                        );
                        skipped.insert(pull_request_id);
                    }
                }
            }
        }

        result.reassigned_count = reassigned.len();
        result.skipped_pull_requests = skipped.into_iter().collect();

        info!(
            deactivated_count = result.deactivated_count,
            reassigned_count = result.reassigned_count,
            removed_slots = result.removed_slots,
            skipped_count = result.skipped_pull_requests.len(),
            "团队批量停用完成"
        );
        Ok(result)
    }

    /// 处理单个 PR 上停用成员的 slot
    fn replace_deactivated_reviewer(
        &self,
        tx: &TxContext<'_>,
        mut pr: PullRequest,
        user_id: &str,
        team_name: &str,
    ) -> EngineResult<SlotOutcome> {
        let Some(slot) = pr.reviewer_slot(user_id) else {
            return Ok(SlotOutcome::Unchanged);
        };

        let outcome = match self.choose_replacement(tx, &pr, team_name)? {
            ReplacementChoice::Selected(new_reviewer) => {
                pr.replace_reviewer(slot, new_reviewer.clone());
                SlotOutcome::Replaced(new_reviewer)
            }
            ReplacementChoice::NoCandidate => {
                pr.remove_reviewer(slot);
                SlotOutcome::Removed
            }
        };

        self.persist(tx, &mut pr)?;
        Ok(outcome)
    }
}
