// ==========================================
// 徒步旅行预订系统 - 余位仓储
// ==========================================
// 表: package_availability
// 不变量: 每次提交时 0 <= current_bookings <= max_bookings
// 占位是一条带条件的 UPDATE，两个写入方不可能
// 同时拿到某日期的最后一个名额
// ==========================================

use crate::db::{format_date, format_datetime, parse_date_column, parse_datetime_column};
use crate::domain::availability::{AvailabilitySlot, SlotUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const SLOT_COLUMNS: &str =
    "id, package_id, available_date, max_bookings, current_bookings, is_available, created_at";

// ==========================================
// AvailabilityRepository - 余位仓储
// ==========================================
pub struct AvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityRepository {
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

    /// 插入新余位
    ///
    /// # 错误
    /// - `AlreadyExists`: 该线路在该日期已有余位
    /// - `ForeignKeyViolation`: 线路不存在
    pub fn insert(&self, slot: &AvailabilitySlot) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_slot(&conn, slot).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => RepositoryError::AlreadyExists {
                entity: "AvailabilitySlot".to_string(),
                key: format!("{}@{}", slot.package_id, slot.available_date),
            },
            other => other,
        })
    }

    /// 在一个事务中插入多个余位，
    /// 跳过已存在的日期
    ///
    /// # 返回
    /// 每个输入余位一个标记：true 为已插入，false 为已跳过
    pub fn insert_batch(&self, slots: &[AvailabilitySlot]) -> RepositoryResult<Vec<bool>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(slots.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO package_availability ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                SLOT_COLUMNS
            ))?;
            for slot in slots {
                let changed = stmt.execute(params![
                    slot.id,
                    slot.package_id,
                    format_date(slot.available_date),
                    slot.max_bookings,
                    slot.current_bookings,
                    slot.is_available,
                    format_datetime(slot.created_at),
                ])?;
                inserted.push(changed == 1);
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AvailabilitySlot>> {
        let conn = self.get_conn()?;
        find_slot_by_id(&conn, id)
    }

    pub fn find_by_package_and_date(
        &self,
        package_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AvailabilitySlot>> {
        let conn = self.get_conn()?;
        let slot = conn
            .query_row(
                &format!(
                    "SELECT {} FROM package_availability WHERE package_id = ?1 AND available_date = ?2",
                    SLOT_COLUMNS
                ),
                params![package_id, format_date(date)],
                map_slot_row,
            )
            .optional()?;
        Ok(slot)
    }

    /// 线路在 `from` 当天及之后的全部余位，按日期升序
    pub fn list_from(&self, package_id: &str, from: NaiveDate) -> RepositoryResult<Vec<AvailabilitySlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM package_availability
             WHERE package_id = ?1 AND available_date >= ?2
             ORDER BY available_date",
            SLOT_COLUMNS
        ))?;
        let slots = stmt
            .query_map(params![package_id, format_date(from)], map_slot_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(slots)
    }

    /// 应用管理员编辑
    ///
    /// # 错误
    /// - `NotFound`: 余位不存在
    /// - `BusinessRuleViolation`: max_bookings 小于 1 或小于
    ///   已占用的预订数
    pub fn update(&self, id: &str, update: &SlotUpdate) -> RepositoryResult<AvailabilitySlot> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut slot =
            find_slot_by_id(&tx, id)?.ok_or_else(|| RepositoryError::not_found("AvailabilitySlot", id))?;

        if let Some(max) = update.max_bookings {
            if max < 1 {
                return Err(RepositoryError::BusinessRuleViolation(
                    "max_bookings must be at least 1".to_string(),
                ));
            }
            if max < slot.current_bookings {
                return Err(RepositoryError::BusinessRuleViolation(format!(
                    "max_bookings {} is below the {} booking(s) already held",
                    max, slot.current_bookings
                )));
            }
            slot.max_bookings = max;
        }
        if let Some(open) = update.is_available {
            slot.is_available = open;
        }

        tx.execute(
            "UPDATE package_availability SET max_bookings = ?2, is_available = ?3 WHERE id = ?1",
            params![id, slot.max_bookings, slot.is_available],
        )?;
        tx.commit()?;
        Ok(slot)
    }

    /// 删除没有预订的余位
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let slot =
            find_slot_by_id(&tx, id)?.ok_or_else(|| RepositoryError::not_found("AvailabilitySlot", id))?;
        if slot.current_bookings > 0 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "slot {} holds {} booking(s) and cannot be removed",
                id, slot.current_bookings
            )));
        }
        tx.execute("DELETE FROM package_availability WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// 占用 `date` 当天的一个名额
    ///
    /// # 错误
    /// - `SlotUnavailable`: 无余位、余位关闭或已满
    pub fn book_package_date(&self, package_id: &str, date: NaiveDate) -> RepositoryResult<AvailabilitySlot> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        claim_slot(&tx, package_id, date)?;
        let slot = tx.query_row(
            &format!(
                "SELECT {} FROM package_availability WHERE package_id = ?1 AND available_date = ?2",
                SLOT_COLUMNS
            ),
            params![package_id, format_date(date)],
            map_slot_row,
        )?;
        tx.commit()?;
        tracing::debug!(package_id, %date, current = slot.current_bookings, max = slot.max_bookings, "slot claimed");
        Ok(slot)
    }

    /// 归还 `date` 当天的一个名额
    ///
    /// # 返回
    /// 有余位被减一时返回 true
    pub fn release_package_date(&self, package_id: &str, date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        release_slot(&conn, package_id, date)
    }
}

// ==========================================
// 连接级辅助函数（与 BookingRepository 共用，
// 占位与插入预订在同一事务中提交）
// ==========================================

pub(crate) fn map_slot_row(row: &Row) -> rusqlite::Result<AvailabilitySlot> {
    Ok(AvailabilitySlot {
        id: row.get(0)?,
        package_id: row.get(1)?,
        available_date: parse_date_column(2, &row.get::<_, String>(2)?)?,
        max_bookings: row.get(3)?,
        current_bookings: row.get(4)?,
        is_available: row.get(5)?,
        created_at: parse_datetime_column(6, &row.get::<_, String>(6)?)?,
    })
}

fn insert_slot(conn: &Connection, slot: &AvailabilitySlot) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO package_availability ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            SLOT_COLUMNS
        ),
        params![
            slot.id,
            slot.package_id,
            format_date(slot.available_date),
            slot.max_bookings,
            slot.current_bookings,
            slot.is_available,
            format_datetime(slot.created_at),
        ],
    )?;
    Ok(())
}

fn find_slot_by_id(conn: &Connection, id: &str) -> RepositoryResult<Option<AvailabilitySlot>> {
    let slot = conn
        .query_row(
            &format!("SELECT {} FROM package_availability WHERE id = ?1", SLOT_COLUMNS),
            params![id],
            map_slot_row,
        )
        .optional()?;
    Ok(slot)
}

pub(crate) fn count_slots(conn: &Connection, package_id: &str) -> RepositoryResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM package_availability WHERE package_id = ?1",
        params![package_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// 条件自增。必须在调用方的事务内执行
pub(crate) fn claim_slot(conn: &Connection, package_id: &str, date: NaiveDate) -> RepositoryResult<()> {
    let changed = conn.execute(
        "UPDATE package_availability
         SET current_bookings = current_bookings + 1
         WHERE package_id = ?1
           AND available_date = ?2
           AND is_available = 1
           AND current_bookings < max_bookings",
        params![package_id, format_date(date)],
    )?;
    if changed == 0 {
        return Err(RepositoryError::SlotUnavailable {
            package_id: package_id.to_string(),
            date: format_date(date),
        });
    }
    Ok(())
}

pub(crate) fn release_slot(conn: &Connection, package_id: &str, date: NaiveDate) -> RepositoryResult<bool> {
    let changed = conn.execute(
        "UPDATE package_availability
         SET current_bookings = current_bookings - 1
         WHERE package_id = ?1 AND available_date = ?2 AND current_bookings > 0",
        params![package_id, format_date(date)],
    )?;
    Ok(changed == 1)
}
