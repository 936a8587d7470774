// ==========================================
// 徒步旅行预订系统 - 配置管理器
// ==========================================
// 存储: config_kv 表 (key-value，scope 'global')
// 缺失或格式错误的值回退到文档中的默认值
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 一年
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 在 `db_path` 上打开独立连接
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 共享已有连接。会再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global 原始值（如已设置）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 插入或覆盖 global 配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "config updated");
        Ok(())
    }

    fn parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, %default, "malformed config value, using default");
                    Ok(default)
                }
            },
        }
    }

    /// 所有 global 配置值的快照（JSON 对象字符串）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从 `get_config_snapshot` 生成的快照恢复配置
    ///
    /// 返回写入的键数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        let tx = conn.transaction()?;
        let mut count = 0;
        for (key, value) in &config_map {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(count)
    }

    // ===== 认证 =====

    /// 最小密码长度（默认 6）
    pub fn min_password_len(&self) -> Result<usize, Box<dyn Error>> {
        self.parsed_or_default(config_keys::AUTH_MIN_PASSWORD_LEN, 6usize)
    }

    /// 会话有效期，单位小时（默认 24，限制在 1..=8760）
    pub fn session_ttl_hours(&self) -> Result<i64, Box<dyn Error>> {
        let v = self.parsed_or_default(config_keys::AUTH_SESSION_TTL_HOURS, 24i64)?;
        Ok(v.clamp(1, MAX_SESSION_TTL_HOURS))
    }

    /// 新密码哈希使用的 PBKDF2 迭代次数
    pub fn pbkdf2_iterations(&self) -> Result<u32, Box<dyn Error>> {
        let v = self.parsed_or_default(
            config_keys::AUTH_PBKDF2_ITERATIONS,
            crate::auth::DEFAULT_PBKDF2_ITERATIONS,
        )?;
        Ok(v.max(1))
    }

    // ===== 余位 =====

    /// 管理员未指定时使用的 max_bookings（默认 1）
    pub fn default_max_bookings(&self) -> Result<i32, Box<dyn Error>> {
        let v = self.parsed_or_default(config_keys::AVAILABILITY_DEFAULT_MAX_BOOKINGS, 1i32)?;
        Ok(v.max(1))
    }

    // ===== 活动日志 =====

    /// 活动历史默认分页大小（默认 50）
    pub fn activity_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.parsed_or_default(config_keys::ACTIVITY_HISTORY_LIMIT, 50usize)
    }

    // ===== 消息 =====

    pub fn whatsapp_enabled(&self) -> Result<bool, Box<dyn Error>> {
        self.parsed_or_default(config_keys::MESSAGING_WHATSAPP_ENABLED, true)
    }

    pub fn email_enabled(&self) -> Result<bool, Box<dyn Error>> {
        self.parsed_or_default(config_keys::MESSAGING_EMAIL_ENABLED, true)
    }

    // ===== 线路目录 =====

    /// 通知中使用的货币符号（默认 ₹）
    pub fn currency_symbol(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::CATALOG_CURRENCY_SYMBOL)?
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "₹".to_string()))
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const AUTH_MIN_PASSWORD_LEN: &str = "auth.min_password_len";
    pub const AUTH_SESSION_TTL_HOURS: &str = "auth.session_ttl_hours";
    pub const AUTH_PBKDF2_ITERATIONS: &str = "auth.pbkdf2_iterations";

    pub const AVAILABILITY_DEFAULT_MAX_BOOKINGS: &str = "availability.default_max_bookings";

    pub const ACTIVITY_HISTORY_LIMIT: &str = "activity.default_history_limit";

    pub const MESSAGING_WHATSAPP_ENABLED: &str = "messaging.whatsapp_enabled";
    pub const MESSAGING_EMAIL_ENABLED: &str = "messaging.email_enabled";

    pub const CATALOG_CURRENCY_SYMBOL: &str = "catalog.currency_symbol";
}
