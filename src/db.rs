// ==========================================
// 徒步旅行预订系统 - SQLite 连接与建表
// ==========================================
// 目标：
// - 所有 Connection::open 走同一套 PRAGMA 配置
// - 所有连接使用统一 busy_timeout，并发预订时等待写锁，
//   而不是直接返回 SQLITE_BUSY
// - 建表幂等，并写入 schema_version
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前构建期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 日历日期的存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时间戳的存储格式（精确到秒）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 对连接应用统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 均为连接级设置。
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 以统一配置打开 SQLite 连接
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 读取 schema_version（表尚不存在时返回 None）
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

/// 建立缺失的表与索引，并记录 schema 版本
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let existing = read_schema_version(conn)?;
    match existing {
        Some(v) if v >= CURRENT_SCHEMA_VERSION => {}
        Some(v) => {
            tracing::info!(
                "upgrading schema_version from {} to {}",
                v,
                CURRENT_SCHEMA_VERSION
            );
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![CURRENT_SCHEMA_VERSION],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![CURRENT_SCHEMA_VERSION],
            )?;
        }
    }
    Ok(())
}

/// 数据库由更新版本创建时给出警告
pub fn check_schema_version(conn: &Connection) -> rusqlite::Result<()> {
    if let Some(v) = read_schema_version(conn)? {
        if v > CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                "database schema_version={} is newer than supported {}",
                v,
                CURRENT_SCHEMA_VERSION
            );
        }
    }
    Ok(())
}

// ==========================================
// 列转换辅助函数
// ==========================================

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

/// 解析 TEXT 日期列，脏数据报告为转换错误
pub fn parse_date_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析 TEXT 时间戳列，脏数据报告为转换错误
pub fn parse_datetime_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析存放字符串 JSON 数组的 TEXT 列
pub fn parse_string_list_column(idx: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析存放枚举字符串形式的 TEXT 列（FromStr）
pub fn parse_enum_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::<dyn std::error::Error + Send + Sync>::from(e),
        )
    })
}

// ==========================================
// 表结构
// ==========================================

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    phone TEXT,
    avatar_url TEXT,
    bio TEXT,
    date_of_birth TEXT,
    emergency_contact TEXT,
    preferences_json TEXT,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_credentials (
    user_id TEXT PRIMARY KEY REFERENCES profiles(id) ON DELETE CASCADE,
    password_hash TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    iterations INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS password_reset_tokens (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL,
    used INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS trek_packages (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    location TEXT NOT NULL,
    duration INTEGER NOT NULL CHECK (duration >= 1),
    difficulty TEXT NOT NULL,
    price REAL NOT NULL CHECK (price > 0),
    max_group_size INTEGER NOT NULL CHECK (max_group_size >= 1),
    images_json TEXT NOT NULL DEFAULT '[]',
    included_json TEXT NOT NULL DEFAULT '[]',
    excluded_json TEXT NOT NULL DEFAULT '[]',
    is_active INTEGER NOT NULL DEFAULT 1,
    rating REAL,
    total_reviews INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS itinerary_days (
    package_id TEXT NOT NULL REFERENCES trek_packages(id) ON DELETE CASCADE,
    day_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    activities_json TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (package_id, day_number)
);

CREATE TABLE IF NOT EXISTS package_availability (
    id TEXT PRIMARY KEY,
    package_id TEXT NOT NULL REFERENCES trek_packages(id) ON DELETE CASCADE,
    available_date TEXT NOT NULL,
    max_bookings INTEGER NOT NULL CHECK (max_bookings >= 1),
    current_bookings INTEGER NOT NULL DEFAULT 0
        CHECK (current_bookings >= 0 AND current_bookings <= max_bookings),
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    UNIQUE (package_id, available_date)
);

CREATE TABLE IF NOT EXISTS bookings (
    id TEXT PRIMARY KEY,
    booking_reference TEXT NOT NULL,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    package_id TEXT NOT NULL REFERENCES trek_packages(id),
    start_date TEXT NOT NULL,
    group_size INTEGER NOT NULL CHECK (group_size >= 1),
    total_amount REAL NOT NULL,
    special_requests TEXT,
    status TEXT NOT NULL,
    payment_status TEXT NOT NULL,
    payment_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    package_id TEXT NOT NULL REFERENCES trek_packages(id) ON DELETE CASCADE,
    booking_id TEXT NOT NULL UNIQUE REFERENCES bookings(id) ON DELETE CASCADE,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS wishlists (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    package_id TEXT NOT NULL REFERENCES trek_packages(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, package_id)
);

CREATE TABLE IF NOT EXISTS message_templates (
    id TEXT PRIMARY KEY,
    channel TEXT NOT NULL,
    name TEXT NOT NULL,
    subject TEXT,
    content TEXT NOT NULL,
    variables_json TEXT NOT NULL DEFAULT '[]',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS message_logs (
    id TEXT PRIMARY KEY,
    booking_id TEXT NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    channel TEXT NOT NULL,
    recipient TEXT NOT NULL,
    subject TEXT,
    content TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    sent_at TEXT NOT NULL,
    delivered_at TEXT
);

CREATE TABLE IF NOT EXISTS user_activity_log (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    activity_type TEXT NOT NULL,
    activity_description TEXT,
    metadata_json TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_availability_package_date
    ON package_availability(package_id, available_date);
CREATE INDEX IF NOT EXISTS idx_bookings_user_created ON bookings(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_bookings_package ON bookings(package_id);
CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
CREATE INDEX IF NOT EXISTS idx_reviews_package ON reviews(package_id, created_at);
CREATE INDEX IF NOT EXISTS idx_wishlists_user ON wishlists(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_message_logs_booking ON message_logs(booking_id, sent_at);
CREATE INDEX IF NOT EXISTS idx_activity_user_ts ON user_activity_log(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON user_sessions(user_id);
"#;
