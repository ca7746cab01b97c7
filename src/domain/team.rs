// ==========================================
// PR 评审人分配服务 - 团队领域模型
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// 团队（名称全局唯一）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(team_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            team_name: team_name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 团队成员（创建团队时的输入）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
        }
    }
}

/// 团队及其成员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamWithMembers {
    /// 将成员转换为归属本团队的用户实体
    pub fn to_users(&self, now: DateTime<Utc>) -> Vec<User> {
        self.members
            .iter()
            .map(|m| User::new(&m.user_id, &m.username, &self.team_name, m.is_active, now))
            .collect()
    }
}
