// ==========================================
// PR 评审人分配服务 - 引擎层错误类型
// ==========================================
// 业务规则失败携带稳定错误码；存储失败原样透传
// ==========================================

use thiserror::Error;

use crate::repository::RepositoryError;

/// 分配引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("PR 已存在: {0}")]
    PrExists(String),

    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: &'static str, id: String },

    #[error("PR 已合并，禁止调整评审人: {0}")]
    PrMerged(String),

    #[error("用户 {user_id} 不是 PR {pull_request_id} 的评审人")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    #[error("PR {pull_request_id} 在团队 {team_name} 内没有可替换的活跃候选人")]
    NoCandidate {
        pull_request_id: String,
        team_name: String,
    },

    #[error("PR 不变量被破坏: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// 业务错误码；存储失败返回 None
    pub fn code(&self) -> Option<&'static str> {
        match self {
            EngineError::PrExists(_) => Some("PR_EXISTS"),
            EngineError::NotFound { .. } => Some("NOT_FOUND"),
            EngineError::PrMerged(_) => Some("PR_MERGED"),
            EngineError::NotAssigned { .. } => Some("NOT_ASSIGNED"),
            EngineError::NoCandidate { .. } => Some("NO_CANDIDATE"),
            EngineError::InvariantViolation(_) | EngineError::Repository(_) => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
