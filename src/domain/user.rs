// ==========================================
// PR 评审人分配服务 - 用户领域模型
// ==========================================
// 不变量: 用户所属团队创建后不变；is_active 为唯一可变的成员属性（用户名除外）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    /// 是否可被分配为评审人
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置活跃标记
    ///
    /// # 返回
    /// - `true`: 状态发生变化
    /// - `false`: 已是目标状态，未修改
    pub fn set_active(&mut self, is_active: bool, now: DateTime<Utc>) -> bool {
        if self.is_active == is_active {
            return false;
        }
        self.is_active = is_active;
        self.updated_at = now;
        true
    }
}
