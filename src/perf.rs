// ==========================================
// 卫星过境排程系统 - SQL 性能跟踪
// ==========================================
// 开关:
// - Debug 默认开启；Release 默认关闭
// - `PASS_SCHEDULER_PERF_SQL=1` 强制开启
// - `PASS_SCHEDULER_SLOW_SQL_MS=50` 慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const PERF_SQL_ENV: &str = "PASS_SCHEDULER_PERF_SQL";
pub const SLOW_SQL_MS_ENV: &str = "PASS_SCHEDULER_SLOW_SQL_MS";

static SQL_TRACKING: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // 当前线程上活跃的 PerfGuard 层数；为 0 时不计数
    static GUARD_DEPTH: Cell<u32> = const { Cell::new(0) };
    static STATEMENTS: Cell<u64> = const { Cell::new(0) };
    static SLOW_STATEMENTS: Cell<u64> = const { Cell::new(0) };
}

fn env_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 为连接安装语句 trace/profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag(PERF_SQL_ENV).unwrap_or(cfg!(debug_assertions));
    SQL_TRACKING.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var(SLOW_SQL_MS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(on_statement));
    conn.profile(Some(on_statement_profiled));
}

fn guard_active() -> bool {
    GUARD_DEPTH.with(|d| d.get() > 0)
}

fn on_statement(_sql: &str) {
    if SQL_TRACKING.load(Ordering::Relaxed) && guard_active() {
        STATEMENTS.with(|c| c.set(c.get().saturating_add(1)));
    }
}

fn on_statement_profiled(sql: &str, elapsed: Duration) {
    if !SQL_TRACKING.load(Ordering::Relaxed) {
        return;
    }

    let ms = elapsed.as_millis() as u64;
    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    if threshold == 0 || ms < threshold {
        return;
    }

    let mut short: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if short.chars().count() > 300 {
        short = short.chars().take(300).collect::<String>() + "…";
    }
    tracing::warn!(target: "slow_sql", duration_ms = ms, sql = %short, "慢 SQL");

    if guard_active() {
        SLOW_STATEMENTS.with(|c| c.set(c.get().saturating_add(1)));
    }
}

/// 操作级性能统计：drop 时输出耗时、SQL 条数、慢 SQL 条数
///
/// ```ignore
/// let _perf = pass_scheduler::perf::PerfGuard::new("optimize_schedule");
/// ```
pub struct PerfGuard {
    op: &'static str,
    started: Instant,
    statements_before: u64,
    slow_before: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            started: Instant::now(),
            statements_before: STATEMENTS.with(|c| c.get()),
            slow_before: SLOW_STATEMENTS.with(|c| c.get()),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let sql_count = STATEMENTS.with(|c| c.get()).saturating_sub(self.statements_before);
        let slow_sql_count = SLOW_STATEMENTS.with(|c| c.get()).saturating_sub(self.slow_before);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
