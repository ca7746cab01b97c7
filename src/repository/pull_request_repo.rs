// ==========================================
// PR 评审人分配服务 - Pull Request 仓储
// ==========================================
// 表: pull_requests, pr_reviewers
// 并发: update 以 (pull_request_id, revision) 为条件（乐观锁）
// 红线: Repository 不含业务逻辑
// ==========================================

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{PrStatus, PullRequest, PullRequestShort};
use crate::repository::contracts::PullRequestStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::unit_of_work::TxContext;

const PR_COLUMNS: &str =
    "pull_request_id, pull_request_name, author_id, status, created_at, merged_at, revision";

// ==========================================
// PullRequestRepository - PR 仓储
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct PullRequestRepository;

impl PullRequestRepository {
    pub fn new() -> Self {
        Self
    }

    fn parse_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<PrStatus> {
        let raw: String = row.get(idx)?;
        PrStatus::parse_db_str(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("未知的 PR 状态: {}", raw).into(),
            )
        })
    }

    /// 映射 pull_requests 行（评审人另行加载）
    fn map_row(row: &Row<'_>) -> rusqlite::Result<PullRequest> {
        Ok(PullRequest {
            pull_request_id: row.get(0)?,
            pull_request_name: row.get(1)?,
            author_id: row.get(2)?,
            status: Self::parse_status(row, 3)?,
            assigned_reviewers: Vec::new(),
            created_at: row.get(4)?,
            merged_at: row.get(5)?,
            revision: row.get(6)?,
        })
    }

    /// 按 slot 顺序加载评审人
    fn load_reviewers(tx: &TxContext<'_>, pull_request_id: &str) -> RepositoryResult<Vec<String>> {
        let mut stmt = tx.conn().prepare_cached(
            "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ?1 ORDER BY slot",
        )?;
        let reviewers = stmt
            .query_map(params![pull_request_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(reviewers)
    }

    /// 覆盖写入评审人（slot = 下标）
    fn write_reviewers(tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<()> {
        tx.conn().execute(
            "DELETE FROM pr_reviewers WHERE pull_request_id = ?1",
            params![&pr.pull_request_id],
        )?;

        let mut stmt = tx.conn().prepare_cached(
            "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, slot) VALUES (?1, ?2, ?3)",
        )?;
        for (slot, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
            stmt.execute(params![&pr.pull_request_id, reviewer_id, slot as i64])?;
        }
        Ok(())
    }

    fn current_revision(
        tx: &TxContext<'_>,
        pull_request_id: &str,
    ) -> RepositoryResult<Option<i64>> {
        let revision = tx
            .conn()
            .query_row(
                "SELECT revision FROM pull_requests WHERE pull_request_id = ?1",
                params![pull_request_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision)
    }
}

impl PullRequestStore for PullRequestRepository {
    fn exists(&self, tx: &TxContext<'_>, pull_request_id: &str) -> RepositoryResult<bool> {
        Ok(Self::current_revision(tx, pull_request_id)?.is_some())
    }

    fn create(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<()> {
        tx.conn().execute(
            r#"INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                created_at, merged_at, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                &pr.pull_request_id,
                &pr.pull_request_name,
                &pr.author_id,
                pr.status.to_db_str(),
                &pr.created_at,
                &pr.merged_at,
                pr.revision,
            ],
        )?;
        Self::write_reviewers(tx, pr)
    }

    fn update(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<i64> {
        let affected = tx.conn().execute(
            r#"UPDATE pull_requests
               SET pull_request_name = ?1, status = ?2, merged_at = ?3, revision = revision + 1
               WHERE pull_request_id = ?4 AND revision = ?5"#,
            params![
                &pr.pull_request_name,
                pr.status.to_db_str(),
                &pr.merged_at,
                &pr.pull_request_id,
                pr.revision,
            ],
        )?;

        if affected == 0 {
            // 区分记录不存在与 revision 冲突
            return match Self::current_revision(tx, &pr.pull_request_id)? {
                None => Err(RepositoryError::not_found("PullRequest", &pr.pull_request_id)),
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    entity: "PullRequest".to_string(),
                    id: pr.pull_request_id.clone(),
                    expected: pr.revision,
                    actual,
                }),
            };
        }

        Self::write_reviewers(tx, pr)?;
        Ok(pr.revision + 1)
    }

    fn get_by_id(
        &self,
        tx: &TxContext<'_>,
        pull_request_id: &str,
    ) -> RepositoryResult<Option<PullRequest>> {
        let pr = tx
            .conn()
            .query_row(
                &format!("SELECT {PR_COLUMNS} FROM pull_requests WHERE pull_request_id = ?1"),
                params![pull_request_id],
                Self::map_row,
            )
            .optional()?;

        match pr {
            Some(mut pr) => {
                pr.assigned_reviewers = Self::load_reviewers(tx, pull_request_id)?;
                Ok(Some(pr))
            }
            None => Ok(None),
        }
    }

    fn get_open_by_reviewer(
        &self,
        tx: &TxContext<'_>,
        user_id: &str,
    ) -> RepositoryResult<Vec<PullRequest>> {
        let mut stmt = tx.conn().prepare(
            r#"SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status,
                      p.created_at, p.merged_at, p.revision
               FROM pull_requests p
               JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
               WHERE r.reviewer_id = ?1 AND p.status = 'OPEN'
               ORDER BY p.created_at, p.pull_request_id"#,
        )?;
        let mut prs = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for pr in &mut prs {
            pr.assigned_reviewers = Self::load_reviewers(tx, &pr.pull_request_id)?;
        }
        Ok(prs)
    }

    fn list_by_reviewer(
        &self,
        tx: &TxContext<'_>,
        user_id: &str,
    ) -> RepositoryResult<Vec<PullRequestShort>> {
        let mut stmt = tx.conn().prepare(
            r#"SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
               FROM pull_requests p
               JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
               WHERE r.reviewer_id = ?1
               ORDER BY p.created_at DESC, p.pull_request_id"#,
        )?;
        let prs = stmt
            .query_map(params![user_id], |row| {
                Ok(PullRequestShort {
                    pull_request_id: row.get(0)?,
                    pull_request_name: row.get(1)?,
                    author_id: row.get(2)?,
                    status: Self::parse_status(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(prs)
    }
}
