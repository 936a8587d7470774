// ==========================================
// 徒步旅行预订系统 - 评价仓储
// ==========================================
// 表: reviews。每次写入都在同一事务中重算线路的
// rating 与 total_reviews
// ==========================================

use crate::db::{format_datetime, parse_datetime_column};
use crate::domain::review::Review;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, r.package_id, r.booking_id, r.rating, r.comment, \
     u.name, r.created_at, r.updated_at \
     FROM reviews r LEFT JOIN profiles u ON u.id = r.user_id";

pub struct ReviewRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// # 错误
    /// - `AlreadyExists`: 该预订已有评价
    pub fn insert(&self, review: &Review) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO reviews (id, user_id, package_id, booking_id, rating, comment, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                review.id,
                review.user_id,
                review.package_id,
                review.booking_id,
                review.rating,
                review.comment,
                format_datetime(review.created_at),
                format_datetime(review.updated_at),
            ],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => RepositoryError::AlreadyExists {
                entity: "Review".to_string(),
                key: review.booking_id.clone(),
            },
            other => other,
        })?;
        recompute_package_rating(&tx, &review.package_id)?;
        tx.commit()?;
        Ok(())
    }

    pub fn update(&self, review: &Review) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE reviews SET rating = ?2, comment = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                review.id,
                review.rating,
                review.comment,
                format_datetime(review.updated_at)
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Review", review.id.clone()));
        }
        recompute_package_rating(&tx, &review.package_id)?;
        tx.commit()?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Review>> {
        let conn = self.get_conn()?;
        let review = conn
            .query_row(
                &format!("{} WHERE r.id = ?1", REVIEW_SELECT),
                params![id],
                map_review_row,
            )
            .optional()?;
        Ok(review)
    }

    /// 线路的评价，按创建时间倒序
    pub fn list_by_package(&self, package_id: &str) -> RepositoryResult<Vec<Review>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE r.package_id = ?1 ORDER BY r.created_at DESC, r.rowid DESC",
            REVIEW_SELECT
        ))?;
        let reviews = stmt
            .query_map(params![package_id], map_review_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }
}

fn map_review_row(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        user_id: row.get(1)?,
        package_id: row.get(2)?,
        booking_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        reviewer_name: row.get(6)?,
        created_at: parse_datetime_column(7, &row.get::<_, String>(7)?)?,
        updated_at: parse_datetime_column(8, &row.get::<_, String>(8)?)?,
    })
}

/// rating = 平均值保留一位小数，无评价时为 NULL
fn recompute_package_rating(conn: &Connection, package_id: &str) -> RepositoryResult<()> {
    conn.execute(
        r#"
        UPDATE trek_packages SET
            rating = (SELECT ROUND(AVG(rating), 1) FROM reviews WHERE package_id = ?1),
            total_reviews = (SELECT COUNT(*) FROM reviews WHERE package_id = ?1)
        WHERE id = ?1
        "#,
        params![package_id],
    )?;
    Ok(())
}
