// ==========================================
// PR 评审人分配服务 - 团队/用户目录仓储
// ==========================================
// 表: teams, users
// 红线: Repository 不含业务逻辑
// ==========================================

use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{Team, User};
use crate::repository::contracts::DirectoryStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::unit_of_work::TxContext;

const USER_COLUMNS: &str = "user_id, username, team_name, is_active, created_at, updated_at";

// ==========================================
// DirectoryRepository - 目录仓储
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct DirectoryRepository;

impl DirectoryRepository {
    pub fn new() -> Self {
        Self
    }

    /// 映射 users 行
    fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            user_id: row.get(0)?,
            username: row.get(1)?,
            team_name: row.get(2)?,
            is_active: row.get::<_, i64>(3)? != 0,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn query_users(
        tx: &TxContext<'_>,
        sql: &str,
        team_name: &str,
    ) -> RepositoryResult<Vec<User>> {
        let mut stmt = tx.conn().prepare(sql)?;
        let users = stmt
            .query_map(params![team_name], Self::map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl DirectoryStore for DirectoryRepository {
    fn team_exists(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<bool> {
        let found = tx
            .conn()
            .query_row(
                "SELECT 1 FROM teams WHERE team_name = ?1",
                params![team_name],
                |_row| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_team(&self, tx: &TxContext<'_>, team: &Team) -> RepositoryResult<()> {
        tx.conn().execute(
            "INSERT INTO teams (team_name, created_at, updated_at) VALUES (?1, ?2, ?3)",
            params![&team.team_name, &team.created_at, &team.updated_at],
        )?;
        Ok(())
    }

    fn get_team(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<Team> {
        tx.conn()
            .query_row(
                "SELECT team_name, created_at, updated_at FROM teams WHERE team_name = ?1",
                params![team_name],
                |row| {
                    Ok(Team {
                        team_name: row.get(0)?,
                        created_at: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("Team", team_name))
    }

    fn get_user(&self, tx: &TxContext<'_>, user_id: &str) -> RepositoryResult<User> {
        tx.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                params![user_id],
                Self::map_user,
            )
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("User", user_id))
    }

    fn get_users_by_team(
        &self,
        tx: &TxContext<'_>,
        team_name: &str,
    ) -> RepositoryResult<Vec<User>> {
        Self::query_users(
            tx,
            &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE team_name = ?1 \
                 ORDER BY username, user_id"
            ),
            team_name,
        )
    }

    fn get_active_users_by_team(
        &self,
        tx: &TxContext<'_>,
        team_name: &str,
    ) -> RepositoryResult<Vec<User>> {
        Self::query_users(
            tx,
            &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE team_name = ?1 AND is_active = 1 \
                 ORDER BY user_id"
            ),
            team_name,
        )
    }

    fn upsert_users(&self, tx: &TxContext<'_>, users: &[User]) -> RepositoryResult<()> {
        // 所属团队不随 upsert 改变
        let mut stmt = tx.conn().prepare_cached(
            r#"INSERT INTO users (user_id, username, team_name, is_active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               ON CONFLICT(user_id) DO UPDATE SET
                   username = excluded.username,
                   is_active = excluded.is_active,
                   updated_at = excluded.updated_at"#,
        )?;

        for user in users {
            stmt.execute(params![
                &user.user_id,
                &user.username,
                &user.team_name,
                user.is_active,
                &user.created_at,
                &user.updated_at,
            ])?;
        }
        Ok(())
    }

    fn update_user(&self, tx: &TxContext<'_>, user: &User) -> RepositoryResult<()> {
        let affected = tx.conn().execute(
            "UPDATE users SET username = ?1, is_active = ?2, updated_at = ?3 WHERE user_id = ?4",
            params![&user.username, user.is_active, &user.updated_at, &user.user_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("User", &user.user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_sqlite_connection, run_migrations};
    use crate::repository::unit_of_work::UnitOfWork;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, UnitOfWork) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        run_migrations(&open_sqlite_connection(&path).unwrap()).unwrap();
        (file, UnitOfWork::new(path))
    }

    #[test]
    fn test_team_and_user_crud() {
        let (_file, uow) = setup();
        let repo = DirectoryRepository::new();
        let now = Utc::now();

        uow.run(|tx| -> RepositoryResult<()> {
            assert!(!repo.team_exists(tx, "backend")?);
            repo.create_team(tx, &Team::new("backend", now))?;
            assert!(repo.team_exists(tx, "backend")?);

            repo.upsert_users(
                tx,
                &[
                    User::new("u2", "bob", "backend", true, now),
                    User::new("u1", "alice", "backend", false, now),
                ],
            )?;

            let all = repo.get_users_by_team(tx, "backend")?;
            assert_eq!(
                all.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
                vec!["alice", "bob"]
            );

            let active = repo.get_active_users_by_team(tx, "backend")?;
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].user_id, "u2");

            let mut alice = repo.get_user(tx, "u1")?;
            assert!(!alice.is_active);
            alice.set_active(true, Utc::now());
            repo.update_user(tx, &alice)?;
            assert!(repo.get_user(tx, "u1")?.is_active);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_rows_report_not_found() {
        let (_file, uow) = setup();
        let repo = DirectoryRepository::new();

        uow.read(|tx| -> RepositoryResult<()> {
            assert!(repo.get_user(tx, "ghost").unwrap_err().is_not_found());
            assert!(repo.get_team(tx, "ghost").unwrap_err().is_not_found());
            let ghost = User::new("ghost", "ghost", "nowhere", true, Utc::now());
            assert!(repo.update_user(tx, &ghost).unwrap_err().is_not_found());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_team_is_unique_violation() {
        let (_file, uow) = setup();
        let repo = DirectoryRepository::new();
        let now = Utc::now();

        let result: RepositoryResult<()> = uow.run(|tx| {
            repo.create_team(tx, &Team::new("backend", now))?;
            repo.create_team(tx, &Team::new("backend", now))
        });
        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
    }

    #[test]
    fn test_upsert_keeps_existing_team() {
        let (_file, uow) = setup();
        let repo = DirectoryRepository::new();
        let now = Utc::now();

        uow.run(|tx| -> RepositoryResult<()> {
            repo.create_team(tx, &Team::new("a", now))?;
            repo.create_team(tx, &Team::new("b", now))?;
            repo.upsert_users(tx, &[User::new("u1", "alice", "a", true, now)])?;
            repo.upsert_users(tx, &[User::new("u1", "alice2", "b", false, now)])?;

            let user = repo.get_user(tx, "u1")?;
            assert_eq!(user.team_name, "a");
            assert_eq!(user.username, "alice2");
            assert!(!user.is_active);
            Ok(())
        })
        .unwrap();
    }
}
