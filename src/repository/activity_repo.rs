// ==========================================
// 徒步旅行预订系统 - 用户活动仓储
// ==========================================
// 表: user_activity_log（只追加）
// ==========================================

use crate::db::{format_datetime, parse_datetime_column};
use crate::domain::activity::UserActivity;
use crate::domain::user::ActivityStats;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct ActivityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, activity: &UserActivity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO user_activity_log (id, user_id, activity_type, activity_description, metadata_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                activity.id,
                activity.user_id,
                activity.activity_type,
                activity.activity_description,
                activity.metadata.as_ref().map(|m| m.to_string()),
                format_datetime(activity.created_at),
            ],
        )?;
        Ok(())
    }

    /// 按时间倒序的最近活动
    pub fn list_recent(&self, user_id: &str, limit: usize) -> RepositoryResult<Vec<UserActivity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, activity_type, activity_description, metadata_json, created_at
            FROM user_activity_log
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], map_activity_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 次数与最后时间。`registration_date` 由调用方填充
    pub fn stats(&self, user_id: &str) -> RepositoryResult<ActivityStats> {
        let conn = self.get_conn()?;
        let (total, last): (i64, Option<String>) = conn.query_row(
            "SELECT COUNT(*), MAX(created_at) FROM user_activity_log WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let last_activity = match last {
            Some(raw) => Some(parse_datetime_column(1, &raw)?),
            None => None,
        };
        Ok(ActivityStats {
            total_activities: total,
            last_activity,
            registration_date: None,
        })
    }
}

fn map_activity_row(row: &Row) -> rusqlite::Result<UserActivity> {
    let metadata = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(UserActivity {
        id: row.get(0)?,
        user_id: row.get(1)?,
        activity_type: row.get(2)?,
        activity_description: row.get(3)?,
        metadata,
        created_at: parse_datetime_column(5, &row.get::<_, String>(5)?)?,
    })
}
