// ==========================================
// 徒步旅行预订系统 - 线路仓储
// ==========================================
// 表: trek_packages、itinerary_days
// 不含业务规则，只做数据访问
// ==========================================

use crate::db::{
    format_datetime, parse_datetime_column, parse_enum_column, parse_string_list_column,
};
use crate::domain::package::{ItineraryDay, PackageSummary, TrekPackage};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const PACKAGE_COLUMNS: &str = "id, title, description, location, duration, difficulty, price, \
     max_group_size, images_json, included_json, excluded_json, is_active, rating, \
     total_reviews, created_at, updated_at";

// ==========================================
// PackageRepository - 线路仓储
// ==========================================
pub struct PackageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackageRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入线路及其行程
    pub fn insert(&self, package: &TrekPackage) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO trek_packages ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                PACKAGE_COLUMNS
            ),
            params![
                package.id,
                package.title,
                package.description,
                package.location,
                package.duration,
                package.difficulty.to_string(),
                package.price,
                package.max_group_size,
                serde_json::to_string(&package.images)?,
                serde_json::to_string(&package.included)?,
                serde_json::to_string(&package.excluded)?,
                package.is_active,
                package.rating,
                package.total_reviews,
                format_datetime(package.created_at),
                format_datetime(package.updated_at),
            ],
        )?;
        write_itinerary(&tx, &package.id, &package.itinerary)?;
        tx.commit()?;
        Ok(())
    }

    /// 覆盖可编辑字段并替换行程
    ///
    /// 评分、评价数与创建时间保持不变
    pub fn update(&self, package: &TrekPackage) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            r#"
            UPDATE trek_packages SET
                title = ?2, description = ?3, location = ?4, duration = ?5,
                difficulty = ?6, price = ?7, max_group_size = ?8,
                images_json = ?9, included_json = ?10, excluded_json = ?11,
                is_active = ?12, updated_at = ?13
            WHERE id = ?1
            "#,
            params![
                package.id,
                package.title,
                package.description,
                package.location,
                package.duration,
                package.difficulty.to_string(),
                package.price,
                package.max_group_size,
                serde_json::to_string(&package.images)?,
                serde_json::to_string(&package.included)?,
                serde_json::to_string(&package.excluded)?,
                package.is_active,
                format_datetime(package.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("TrekPackage", package.id.clone()));
        }
        tx.execute(
            "DELETE FROM itinerary_days WHERE package_id = ?1",
            params![package.id],
        )?;
        write_itinerary(&tx, &package.id, &package.itinerary)?;
        tx.commit()?;
        Ok(())
    }

    /// 按 id 查找，不论是否上架
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<TrekPackage>> {
        let conn = self.get_conn()?;
        let package = conn
            .query_row(
                &format!("SELECT {} FROM trek_packages WHERE id = ?1", PACKAGE_COLUMNS),
                params![id],
                map_package_row,
            )
            .optional()?;

        match package {
            Some(mut p) => {
                p.itinerary = load_itinerary(&conn, id)?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    /// 上架线路，评分高者在前。无评分的排在最后
    pub fn list_active(&self) -> RepositoryResult<Vec<TrekPackage>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM trek_packages WHERE is_active = 1 \
             ORDER BY rating IS NULL, rating DESC, created_at DESC, rowid DESC",
            PACKAGE_COLUMNS
        );
        let mut packages = query_packages(&conn, &sql)?;
        attach_itineraries(&conn, &mut packages)?;
        Ok(packages)
    }

    /// 全部线路（管理视图），按创建时间倒序
    pub fn list_all(&self) -> RepositoryResult<Vec<TrekPackage>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM trek_packages ORDER BY created_at DESC, rowid DESC",
            PACKAGE_COLUMNS
        );
        let mut packages = query_packages(&conn, &sql)?;
        attach_itineraries(&conn, &mut packages)?;
        Ok(packages)
    }

    pub fn find_summary(&self, id: &str) -> RepositoryResult<Option<PackageSummary>> {
        let conn = self.get_conn()?;
        let summary = conn
            .query_row(
                &format!("SELECT {} FROM trek_packages WHERE id = ?1", PACKAGE_COLUMNS),
                params![id],
                map_package_row,
            )
            .optional()?;
        Ok(summary.map(|p| p.summary()))
    }

    pub fn set_active(&self, id: &str, is_active: bool, now: chrono::NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE trek_packages SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, is_active, format_datetime(now)],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("TrekPackage", id));
        }
        Ok(())
    }

    /// 删除没有任何预订引用的线路
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let referenced: i64 = tx.query_row(
            "SELECT COUNT(*) FROM bookings WHERE package_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if referenced > 0 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "package {} has {} booking(s) and cannot be deleted",
                id, referenced
            )));
        }
        let changed = tx.execute("DELETE FROM trek_packages WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::not_found("TrekPackage", id));
        }
        tx.commit()?;
        Ok(())
    }

    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM trek_packages WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 上架线路的去重地点，按字母序
    pub fn list_active_locations(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT location FROM trek_packages WHERE is_active = 1 ORDER BY location",
        )?;
        let locations = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }
}

// ==========================================
// 行映射
// ==========================================

pub(crate) fn map_package_row(row: &Row) -> rusqlite::Result<TrekPackage> {
    Ok(TrekPackage {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        duration: row.get(4)?,
        difficulty: parse_enum_column(5, &row.get::<_, String>(5)?)?,
        price: row.get(6)?,
        max_group_size: row.get(7)?,
        images: parse_string_list_column(8, &row.get::<_, String>(8)?)?,
        included: parse_string_list_column(9, &row.get::<_, String>(9)?)?,
        excluded: parse_string_list_column(10, &row.get::<_, String>(10)?)?,
        is_active: row.get(11)?,
        rating: row.get(12)?,
        total_reviews: row.get(13)?,
        created_at: parse_datetime_column(14, &row.get::<_, String>(14)?)?,
        updated_at: parse_datetime_column(15, &row.get::<_, String>(15)?)?,
        itinerary: Vec::new(),
    })
}

fn query_packages(conn: &Connection, sql: &str) -> RepositoryResult<Vec<TrekPackage>> {
    let mut stmt = conn.prepare(sql)?;
    let packages = stmt
        .query_map([], map_package_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(packages)
}

fn write_itinerary(tx: &Transaction, package_id: &str, days: &[ItineraryDay]) -> RepositoryResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO itinerary_days (package_id, day_number, title, description, activities_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for day in days {
        stmt.execute(params![
            package_id,
            day.day,
            day.title,
            day.description,
            serde_json::to_string(&day.activities)?,
        ])?;
    }
    Ok(())
}

fn map_itinerary_row(row: &Row) -> rusqlite::Result<(String, ItineraryDay)> {
    Ok((
        row.get(0)?,
        ItineraryDay {
            day: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            activities: parse_string_list_column(4, &row.get::<_, String>(4)?)?,
        },
    ))
}

fn load_itinerary(conn: &Connection, package_id: &str) -> RepositoryResult<Vec<ItineraryDay>> {
    let mut stmt = conn.prepare(
        "SELECT package_id, day_number, title, description, activities_json
         FROM itinerary_days WHERE package_id = ?1 ORDER BY day_number",
    )?;
    let days = stmt
        .query_map(params![package_id], map_itinerary_row)?
        .map(|r| r.map(|(_, day)| day))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(days)
}

/// 一次查询取出全部行程，而不是每条线路查一次
fn attach_itineraries(conn: &Connection, packages: &mut [TrekPackage]) -> RepositoryResult<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut stmt = conn.prepare(
        "SELECT package_id, day_number, title, description, activities_json
         FROM itinerary_days ORDER BY package_id, day_number",
    )?;
    let mut by_package: HashMap<String, Vec<ItineraryDay>> = HashMap::new();
    for row in stmt.query_map([], map_itinerary_row)? {
        let (package_id, day) = row?;
        by_package.entry(package_id).or_default().push(day);
    }
    for package in packages.iter_mut() {
        package.itinerary = by_package.remove(&package.id).unwrap_or_default();
    }
    Ok(())
}
