// ==========================================
// PR 评审人分配服务 - 统计仓储
// ==========================================
// 只读聚合查询
// ==========================================

use rusqlite::params;
use std::collections::BTreeMap;

use crate::domain::Statistics;
use crate::repository::error::RepositoryResult;
use crate::repository::unit_of_work::TxContext;

#[derive(Debug, Default, Clone)]
pub struct StatisticsRepository;

impl StatisticsRepository {
    pub fn new() -> Self {
        Self
    }

    fn count(tx: &TxContext<'_>, sql: &str) -> RepositoryResult<i64> {
        Ok(tx.conn().query_row(sql, params![], |row| row.get(0))?)
    }

    fn grouped_counts(tx: &TxContext<'_>, sql: &str) -> RepositoryResult<BTreeMap<String, i64>> {
        let mut stmt = tx.conn().prepare(sql)?;
        let rows = stmt
            .query_map(params![], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(rows)
    }

    /// 采集统计快照（调用方应在只读事务中调用以保证一致）
    pub fn collect(&self, tx: &TxContext<'_>) -> RepositoryResult<Statistics> {
        Ok(Statistics {
            total_prs: Self::count(tx, "SELECT COUNT(*) FROM pull_requests")?,
            open_prs: Self::count(
                tx,
                "SELECT COUNT(*) FROM pull_requests WHERE status = 'OPEN'",
            )?,
            merged_prs: Self::count(
                tx,
                "SELECT COUNT(*) FROM pull_requests WHERE status = 'MERGED'",
            )?,
            assignments_by_user: Self::grouped_counts(
                tx,
                "SELECT reviewer_id, COUNT(*) FROM pr_reviewers GROUP BY reviewer_id",
            )?,
            assignments_by_pr: Self::grouped_counts(
                tx,
                "SELECT pull_request_id, COUNT(*) FROM pr_reviewers GROUP BY pull_request_id",
            )?,
            total_teams: Self::count(tx, "SELECT COUNT(*) FROM teams")?,
            total_users: Self::count(tx, "SELECT COUNT(*) FROM users")?,
            active_users: Self::count(tx, "SELECT COUNT(*) FROM users WHERE is_active = 1")?,
        })
    }
}
