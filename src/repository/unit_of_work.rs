// ==========================================
// PR 评审人分配服务 - 工作单元 (Unit of Work)
// ==========================================
// 职责: 把一组仓储读写包进一个原子事务，成功提交、失败回滚
// 约定:
// - 每个工作单元独占一个连接，写事务使用 BEGIN IMMEDIATE，写者在存储层串行化
// - 已在工作单元内的调用通过 run_in / join 加入外层单元，不开嵌套事务
// - 仓储方法一律显式接收 &TxContext
// ==========================================

use rusqlite::{Connection, TransactionBehavior};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};

static SAVEPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// 事务上下文：工作单元内所有仓储调用共享的连接句柄
pub struct TxContext<'c> {
    conn: &'c Connection,
}

impl<'c> TxContext<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 当前事务内的连接
    pub fn conn(&self) -> &Connection {
        self.conn
    }

    /// 在当前工作单元内执行（不开启新事务）
    pub fn join<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
    {
        f(self)
    }

    /// 在保存点内执行 f
    ///
    /// f 失败时回滚到保存点（保存点之前的写入保留），错误原样返回；
    /// 外层事务是否提交由调用方决定。
    pub fn savepoint<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let name = format!("sp_{}", SAVEPOINT_SEQ.fetch_add(1, Ordering::Relaxed));
        self.conn
            .execute_batch(&format!("SAVEPOINT {name}"))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE SAVEPOINT {name}"))
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                let rollback = format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}");
                if let Err(rb) = self.conn.execute_batch(&rollback) {
                    tracing::error!(savepoint = %name, error = %rb, "保存点回滚失败");
                    return Err(RepositoryError::DatabaseTransactionError(rb.to_string()).into());
                }
                Err(err)
            }
        }
    }
}

/// 工作单元管理器
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    db_path: String,
}

impl UnitOfWork {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    fn open(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 在一个原子写事务中执行 f
    ///
    /// # 返回
    /// - f 返回 Ok: 提交并返回结果
    /// - f 返回 Err: 回滚并原样返回错误
    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.execute(TransactionBehavior::Immediate, f)
    }

    /// 在只读（DEFERRED）事务中执行 f，保证多次读取看到同一快照
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.execute(TransactionBehavior::Deferred, f)
    }

    /// 若已处于工作单元内则加入，否则开启新的写事务
    pub fn run_in<T, E, F>(&self, existing: Option<&TxContext<'_>>, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        match existing {
            Some(tx) => tx.join(f),
            None => self.run(f),
        }
    }

    fn execute<T, E, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.open()?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(RepositoryError::from)?;

        let result = f(&TxContext::new(&tx));

        match result {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rb) = tx.rollback() {
                    tracing::warn!(error = %rb, "事务回滚失败");
                }
                Err(err)
            }
        }
    }
}
