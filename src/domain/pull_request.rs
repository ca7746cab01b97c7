// ==========================================
// PR 评审人分配服务 - Pull Request 领域模型
// ==========================================
// 不变量:
// - 作者永不出现在评审人列表中
// - 评审人列表无重复，长度 ≤ MAX_REVIEWERS
// - merged_at 当且仅当 status = MERGED 时存在，且只在首次合并时写入
// - MERGED 后评审人列表冻结
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::types::PrStatus;

/// 单个 PR 的评审人上限
pub const MAX_REVIEWERS: usize = 2;

/// Pull Request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    /// 有序评审人列表（下标即 slot）
    pub assigned_reviewers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    /// 乐观锁版本号
    pub revision: i64,
}

/// Pull Request 简要信息（评审列表用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
}

impl PullRequest {
    /// 构造一个新的 OPEN 状态 PR
    pub fn new_open(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
        assigned_reviewers: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers,
            created_at: now,
            merged_at: None,
            revision: 1,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    /// 查找评审人所在 slot
    pub fn reviewer_slot(&self, user_id: &str) -> Option<usize> {
        self.assigned_reviewers.iter().position(|r| r == user_id)
    }

    /// 替换指定 slot 的评审人，其余 slot 不变
    ///
    /// # 返回
    /// - 被替换下来的评审人 ID；slot 越界时返回 None
    pub fn replace_reviewer(
        &mut self,
        slot: usize,
        new_reviewer: impl Into<String>,
    ) -> Option<String> {
        let current = self.assigned_reviewers.get_mut(slot)?;
        Some(std::mem::replace(current, new_reviewer.into()))
    }

    /// 移除指定 slot，后续评审人前移
    pub fn remove_reviewer(&mut self, slot: usize) -> Option<String> {
        if slot < self.assigned_reviewers.len() {
            Some(self.assigned_reviewers.remove(slot))
        } else {
            None
        }
    }

    /// 标记为已合并（幂等）
    ///
    /// # 返回
    /// - `true`: 本次完成 OPEN → MERGED 转换
    /// - `false`: 已经是 MERGED，未做任何修改
    pub fn mark_merged(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(now);
        true
    }

    /// 当前评审人 + 作者，作为选择候选人时的排除集合
    pub fn excluded_participants(&self) -> HashSet<String> {
        let mut exclude: HashSet<String> = self.assigned_reviewers.iter().cloned().collect();
        exclude.insert(self.author_id.clone());
        exclude
    }

    /// 校验评审人不变量
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.assigned_reviewers.len() > MAX_REVIEWERS {
            return Err(format!(
                "PR {} 评审人数量 {} 超过上限 {}",
                self.pull_request_id,
                self.assigned_reviewers.len(),
                MAX_REVIEWERS
            ));
        }
        if self.assigned_reviewers.iter().any(|r| r == &self.author_id) {
            return Err(format!(
                "PR {} 作者 {} 不能作为评审人",
                self.pull_request_id, self.author_id
            ));
        }
        let unique: HashSet<&String> = self.assigned_reviewers.iter().collect();
        if unique.len() != self.assigned_reviewers.len() {
            return Err(format!("PR {} 评审人重复", self.pull_request_id));
        }
        if self.is_merged() != self.merged_at.is_some() {
            return Err(format!(
                "PR {} 状态 {} 与 merged_at 不一致",
                self.pull_request_id, self.status
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pr() -> PullRequest {
        PullRequest::new_open(
            "pr-1",
            "feat",
            "A",
            vec!["B".to_string(), "C".to_string()],
            Utc::now(),
        )
    }

    #[test]
    fn test_replace_reviewer_keeps_slot_order() {
        let mut pr = sample_pr();
        let slot = pr.reviewer_slot("B").unwrap();
        assert_eq!(pr.replace_reviewer(slot, "D"), Some("B".to_string()));
        assert_eq!(pr.assigned_reviewers, vec!["D", "C"]);
        assert!(pr.check_invariants().is_ok());
        assert_eq!(pr.replace_reviewer(5, "E"), None);
    }

    #[test]
    fn test_remove_reviewer() {
        let mut pr = sample_pr();
        assert_eq!(pr.remove_reviewer(0), Some("B".to_string()));
        assert_eq!(pr.assigned_reviewers, vec!["C"]);
        assert_eq!(pr.remove_reviewer(3), None);
    }

    #[test]
    fn test_mark_merged_is_idempotent() {
        let mut pr = sample_pr();
        let first = Utc::now();
        assert!(pr.mark_merged(first));
        assert_eq!(pr.merged_at, Some(first));

        let snapshot = pr.clone();
        assert!(!pr.mark_merged(first + chrono::Duration::seconds(5)));
        assert_eq!(pr, snapshot);
        assert!(pr.check_invariants().is_ok());
    }

    #[test]
    fn test_check_invariants_detects_violations() {
        let mut pr = sample_pr();
        pr.assigned_reviewers = vec!["A".to_string()];
        assert!(pr.check_invariants().is_err());

        pr.assigned_reviewers = vec!["B".to_string(), "B".to_string()];
        assert!(pr.check_invariants().is_err());

        pr.assigned_reviewers = vec!["B".to_string(), "C".to_string(), "D".to_string()];
        assert!(pr.check_invariants().is_err());

        pr.assigned_reviewers = vec![];
        pr.status = PrStatus::Merged;
        assert!(pr.check_invariants().is_err());
    }

    #[test]
    fn test_excluded_participants() {
        let pr = sample_pr();
        let exclude = pr.excluded_participants();
        assert_eq!(exclude.len(), 3);
        assert!(exclude.contains("A") && exclude.contains("B") && exclude.contains("C"));
    }
}
