// ==========================================
// 徒步旅行预订系统 - SQL 耗时统计
// ==========================================
// 慢 SQL 告警附带语句动词与所操作的表，
// 另提供 `timed` 用于预订写路径计时
//
// 环境变量：
// - TREK_BOOKING_PERF_SQL=1      强制开启（Debug 构建默认开启）
// - TREK_BOOKING_SLOW_SQL_MS=50  慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const PERF_SQL_ENV: &str = "TREK_BOOKING_PERF_SQL";
pub const SLOW_SQL_MS_ENV: &str = "TREK_BOOKING_SLOW_SQL_MS";

// 0 = 未启用
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

/// 解析后的计时开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTiming {
    pub enabled: bool,
    pub slow_ms: u64,
}

impl SqlTiming {
    /// 从变量查找函数解析。Debug 构建默认开启，阈值 50ms；
    /// Release 构建默认关闭，阈值 200ms。
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = cfg!(debug_assertions);
        let enabled = lookup(PERF_SQL_ENV).map_or(debug, |v| {
            matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
        });
        let slow_ms = lookup(SLOW_SQL_MS_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if debug { 50 } else { 200 });
        Self { enabled, slow_ms }
    }

    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }
}

/// 在连接上安装慢 SQL 钩子
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let timing = SqlTiming::from_env();
    if !timing.enabled || timing.slow_ms == 0 {
        conn.profile(None);
        return;
    }
    SLOW_SQL_MS.store(timing.slow_ms, Ordering::Relaxed);
    conn.profile(Some(on_statement_done));
}

fn on_statement_done(sql: &str, duration: Duration) {
    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    if threshold == 0 || ms < threshold {
        return;
    }
    let (verb, table) = statement_target(sql);
    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        verb,
        table = table.unwrap_or("-"),
        "slow sql"
    );
}

/// 语句的动词与主表，例如 `("UPDATE", Some("bookings"))`
pub fn statement_target(sql: &str) -> (&'static str, Option<&str>) {
    let mut words = sql.split_whitespace();
    let verb = match words.next().map(|w| w.to_ascii_uppercase()) {
        Some(w) if w == "SELECT" => "SELECT",
        Some(w) if w == "INSERT" => "INSERT",
        Some(w) if w == "UPDATE" => "UPDATE",
        Some(w) if w == "DELETE" => "DELETE",
        Some(w) if w == "BEGIN" || w == "COMMIT" || w == "ROLLBACK" => "TX",
        _ => "OTHER",
    };
    let marker = match verb {
        "SELECT" | "DELETE" => "FROM",
        "INSERT" => "INTO",
        "UPDATE" => return (verb, words.next().map(trim_ident)),
        _ => return (verb, None),
    };
    let table = words
        .skip_while(|w| !w.eq_ignore_ascii_case(marker))
        .nth(1)
        .map(trim_ident);
    (verb, table)
}

fn trim_ident(word: &str) -> &str {
    word.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// 执行 `f`，并记录该预订操作的耗时
pub fn timed<T>(op: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    tracing::debug!(target: "perf", op, elapsed_ms = start.elapsed().as_millis() as u64, "done");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_switches() {
        let on = SqlTiming::resolve(|k| match k {
            PERF_SQL_ENV => Some(" YES ".to_string()),
            SLOW_SQL_MS_ENV => Some("15".to_string()),
            _ => None,
        });
        assert_eq!(on, SqlTiming { enabled: true, slow_ms: 15 });

        let off = SqlTiming::resolve(|k| (k == PERF_SQL_ENV).then(|| "0".to_string()));
        assert!(!off.enabled);

        let bad_threshold = SqlTiming::resolve(|k| (k == SLOW_SQL_MS_ENV).then(|| "soon".to_string()));
        assert_eq!(bad_threshold.slow_ms, if cfg!(debug_assertions) { 50 } else { 200 });
    }

    #[test]
    fn test_statement_target() {
        assert_eq!(
            statement_target("UPDATE package_availability SET current_bookings = 1"),
            ("UPDATE", Some("package_availability"))
        );
        assert_eq!(
            statement_target("SELECT b.id FROM bookings b JOIN profiles u ON u.id = b.user_id"),
            ("SELECT", Some("bookings"))
        );
        assert_eq!(
            statement_target("\n  INSERT INTO wishlists (id) VALUES (?1)"),
            ("INSERT", Some("wishlists"))
        );
        assert_eq!(statement_target("delete from \"sessions\" where 1"), ("DELETE", Some("sessions")));
        assert_eq!(statement_target("COMMIT"), ("TX", None));
        assert_eq!(statement_target("PRAGMA foreign_keys = ON"), ("OTHER", None));
    }

    #[test]
    fn test_timed_returns_the_value() {
        assert_eq!(timed("noop", || 7), 7);
    }
}
