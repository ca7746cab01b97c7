// ==========================================
// PR 评审人分配服务 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 并发控制错误 =====
    #[error("乐观锁冲突: {entity}(id={id}) revision {expected} != {actual}")]
    OptimisticLockFailure {
        entity: String,
        id: String,
        expected: i64,
        actual: i64,
    },

    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量错误 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // busy/locked 无论是否附带消息都归为锁错误
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                RepositoryError::LockError(e.to_string())
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32, msg: Option<&str>) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), msg.map(str::to_string))
    }

    #[test]
    fn test_busy_and_locked_map_to_lock_error_with_message() {
        let busy =
            RepositoryError::from(sqlite_failure(ffi::SQLITE_BUSY, Some("database is locked")));
        assert!(matches!(busy, RepositoryError::LockError(_)));

        let locked = RepositoryError::from(sqlite_failure(ffi::SQLITE_LOCKED, None));
        assert!(matches!(locked, RepositoryError::LockError(_)));
    }

    #[test]
    fn test_constraint_messages_are_classified() {
        let unique = RepositoryError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT,
            Some("UNIQUE constraint failed: teams.team_name"),
        ));
        assert!(matches!(unique, RepositoryError::UniqueConstraintViolation(_)));

        let fk = RepositoryError::from(sqlite_failure(
            ffi::SQLITE_CONSTRAINT,
            Some("FOREIGN KEY constraint failed"),
        ));
        assert!(matches!(fk, RepositoryError::ForeignKeyViolation(_)));
    }
}
