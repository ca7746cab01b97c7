// ==========================================
// PR 评审人分配服务 - 统计快照
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 全局统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_prs: i64,
    pub open_prs: i64,
    pub merged_prs: i64,
    /// user_id -> 被分配为评审人的 PR 数
    pub assignments_by_user: BTreeMap<String, i64>,
    /// pull_request_id -> 评审人数
    pub assignments_by_pr: BTreeMap<String, i64>,
    pub total_teams: i64,
    pub total_users: i64,
    pub active_users: i64,
}
