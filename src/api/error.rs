// ==========================================
// PR 评审人分配服务 - API层错误类型
// ==========================================
// 职责: 定义对外错误分类（稳定错误码 + 可读消息），
//       转换 Repository / Engine 错误
// ==========================================

use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 非业务错误统一对外错误码
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误（稳定错误码）
    // ==========================================
    #[error("团队已存在: {0}")]
    TeamExists(String),

    #[error("PR 已存在: {0}")]
    PrExists(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("PR 已合并: {0}")]
    PrMerged(String),

    #[error("评审人未分配: {0}")]
    NotAssigned(String),

    #[error("无可用候选人: {0}")]
    NoCandidate(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 基础设施错误（统一映射为 INTERNAL_ERROR）
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::TeamExists(_) => "TEAM_EXISTS",
            ApiError::PrExists(_) => "PR_EXISTS",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PrMerged(_) => "PR_MERGED",
            ApiError::NotAssigned(_) => "NOT_ASSIGNED",
            ApiError::NoCandidate(_) => "NO_CANDIDATE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => INTERNAL_ERROR_CODE,
        }
    }

    /// 是否为业务规则错误（区别于基础设施错误）
    pub fn is_domain(&self) -> bool {
        self.code() != INTERNAL_ERROR_CODE
    }
}

// ==========================================
// 从Repository错误转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发写入导致条件更新落空：对调用方表现为目标已不在预期状态
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::NotFound(format!(
                "{}(id={})已被并发修改（期望revision={}，实际revision={}），请重试",
                entity, id, expected, actual
            )),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}取值错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从Engine错误转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::PrExists(id) => ApiError::PrExists(format!("PR {} 已存在", id)),
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::PrMerged(id) => {
                ApiError::PrMerged(format!("PR {} 已合并，不能调整评审人", id))
            }
            e @ EngineError::NotAssigned { .. } => ApiError::NotAssigned(e.to_string()),
            e @ EngineError::NoCandidate { .. } => ApiError::NoCandidate(e.to_string()),
            EngineError::InvariantViolation(msg) => ApiError::InternalError(msg),
            EngineError::Repository(e) => ApiError::from(e),
        }
    }
}

/// API Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
