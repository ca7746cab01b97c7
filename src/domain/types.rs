// ==========================================
// PR 评审人分配服务 - 领域类型定义
// ==========================================
// 职责: 状态枚举及其数据库/JSON 表示
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PR 生命周期状态 (PrStatus)
// ==========================================
// 状态机: OPEN → MERGED（仅一次；MERGED 为终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    Open,   // 进行中，可调整评审人
    Merged, // 已合并，评审人冻结
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl PrStatus {
    /// 从数据库字符串解析状态；未知值返回 None
    pub fn parse_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Some(PrStatus::Open),
            "MERGED" => Some(PrStatus::Merged),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// 是否允许变更评审人
    pub fn allows_reviewer_change(&self) -> bool {
        matches!(self, PrStatus::Open)
    }
}
