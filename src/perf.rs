// ==========================================
// PR 评审人分配服务 - 性能观测
// ==========================================
// 职责: SQL 语句计数、慢 SQL 日志、操作耗时统计
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// SQL 观测开关（进程内只解析一次环境变量）
#[derive(Debug, Clone, Copy)]
struct PerfSettings {
    enabled: bool,
    slow_sql_ms: u64,
}

static PERF_SETTINGS: OnceLock<PerfSettings> = OnceLock::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
    static SQL_COUNT: Cell<u64> = const { Cell::new(0) };
    static SLOW_SQL_COUNT: Cell<u64> = const { Cell::new(0) };
}

pub(crate) fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

fn settings() -> PerfSettings {
    *PERF_SETTINGS.get_or_init(|| {
        let enabled = match std::env::var("PR_REVIEWER_PERF_SQL") {
            Ok(v) => is_true(&v),
            Err(_) => cfg!(debug_assertions),
        };
        let slow_sql_ms = std::env::var("PR_REVIEWER_SLOW_SQL_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        PerfSettings {
            enabled,
            slow_sql_ms,
        }
    })
}

/// 安装 SQLite 语句 trace/profile（用于 SQL 计数 + 慢查询日志）
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭
/// - `PR_REVIEWER_PERF_SQL=1` 强制开启
/// - `PR_REVIEWER_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    if !settings().enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn sql_trace_callback(_sql: &str) {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if !active {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    let ms = duration.as_millis() as u64;
    let threshold = settings().slow_sql_ms;
    if threshold > 0 && ms >= threshold {
        let sql_short = truncate_sql(sql, 420);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql_short,
            "slow sql"
        );
        let active = PERF_DEPTH.with(|d| d.get() > 0);
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数 + 慢 SQL 数
///
/// ```ignore
/// let _perf = pr_reviewer_service::perf::PerfGuard::new("create_pull_request");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
            slow_sql_start: SLOW_SQL_COUNT.with(|c| c.get()),
        }
    }

    /// 已耗时（毫秒）
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        let sql_count = SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start);
        let slow_sql_count = SLOW_SQL_COUNT
            .with(|c| c.get())
            .saturating_sub(self.slow_sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
