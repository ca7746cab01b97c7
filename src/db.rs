// ==========================================
// PR 评审人分配服务 - SQLite 连接初始化与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建库脚本，启动时幂等执行
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    team_name   TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    username    TEXT NOT NULL,
    team_name   TEXT NOT NULL REFERENCES teams(team_name),
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_team_active ON users(team_name, is_active);

CREATE TABLE IF NOT EXISTS pull_requests (
    pull_request_id    TEXT PRIMARY KEY,
    pull_request_name  TEXT NOT NULL,
    author_id          TEXT NOT NULL REFERENCES users(user_id),
    status             TEXT NOT NULL CHECK (status IN ('OPEN', 'MERGED')),
    created_at         TEXT NOT NULL,
    merged_at          TEXT,
    revision           INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_pull_requests_status ON pull_requests(status);

CREATE TABLE IF NOT EXISTS pr_reviewers (
    pull_request_id  TEXT NOT NULL REFERENCES pull_requests(pull_request_id) ON DELETE CASCADE,
    reviewer_id      TEXT NOT NULL REFERENCES users(user_id),
    slot             INTEGER NOT NULL CHECK (slot IN (0, 1)),
    PRIMARY KEY (pull_request_id, reviewer_id),
    UNIQUE (pull_request_id, slot)
);

CREATE INDEX IF NOT EXISTS idx_pr_reviewers_reviewer ON pr_reviewers(reviewer_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 执行建库脚本（幂等）
///
/// # 返回
/// - `Ok(version)`: 执行后的 schema_version
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<i64> {
    // WAL 下读事务不阻塞写事务；内存库会返回 "memory"，忽略结果即可
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;

    conn.execute_batch(SCHEMA_V1)?;

    let current = read_schema_version(conn)?.unwrap_or(0);
    if current < CURRENT_SCHEMA_VERSION {
        conn.execute(
            "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now()],
        )?;
        tracing::info!(
            from = current,
            to = CURRENT_SCHEMA_VERSION,
            "数据库 schema 已初始化/升级"
        );
    }

    Ok(CURRENT_SCHEMA_VERSION)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
