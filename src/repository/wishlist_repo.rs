// ==========================================
// 徒步旅行预订系统 - 心愿单仓储
// ==========================================
// 表: wishlists，UNIQUE(user_id, package_id)
// ==========================================

use crate::db::{format_datetime, parse_datetime_column, parse_enum_column, parse_string_list_column};
use crate::domain::package::PackageSummary;
use crate::domain::review::WishlistEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct WishlistRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WishlistRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// # 错误
    /// - `AlreadyExists`: 该线路已在心愿单中
    pub fn insert(&self, entry: &WishlistEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO wishlists (id, user_id, package_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id,
                entry.user_id,
                entry.package_id,
                format_datetime(entry.created_at)
            ],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => RepositoryError::AlreadyExists {
                entity: "WishlistEntry".to_string(),
                key: format!("{}/{}", entry.user_id, entry.package_id),
            },
            other => other,
        })?;
        Ok(())
    }

    /// # 返回
    /// 有条目被删除时返回 true
    pub fn delete(&self, user_id: &str, package_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "DELETE FROM wishlists WHERE user_id = ?1 AND package_id = ?2",
            params![user_id, package_id],
        )?;
        Ok(changed > 0)
    }

    pub fn exists(&self, user_id: &str, package_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: i64 = conn.query_row(
            "SELECT COUNT(*) FROM wishlists WHERE user_id = ?1 AND package_id = ?2",
            params![user_id, package_id],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }

    /// 条目及线路摘要，按创建时间倒序
    pub fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<WishlistEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT w.id, w.user_id, w.package_id, w.created_at,
                   p.id, p.title, p.location, p.duration, p.difficulty, p.price,
                   p.images_json, p.rating, p.total_reviews
            FROM wishlists w
            LEFT JOIN trek_packages p ON p.id = w.package_id
            WHERE w.user_id = ?1
            ORDER BY w.created_at DESC, w.rowid DESC
            "#,
        )?;
        let entries = stmt
            .query_map(params![user_id], |row| {
                let package = match row.get::<_, Option<String>>(4)? {
                    Some(id) => Some(PackageSummary {
                        id,
                        title: row.get(5)?,
                        location: row.get(6)?,
                        duration: row.get(7)?,
                        difficulty: parse_enum_column(8, &row.get::<_, String>(8)?)?,
                        price: row.get(9)?,
                        images: parse_string_list_column(10, &row.get::<_, String>(10)?)?,
                        rating: row.get(11)?,
                        total_reviews: row.get(12)?,
                    }),
                    None => None,
                };
                Ok(WishlistEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    package_id: row.get(2)?,
                    created_at: parse_datetime_column(3, &row.get::<_, String>(3)?)?,
                    package,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
