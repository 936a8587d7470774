// ==========================================
// 徒步旅行预订系统 - 预订仓储
// ==========================================
// 表: bookings（关联 profiles、trek_packages）
// 插入预订与占位在同一个 IMMEDIATE 事务中提交
// ==========================================

use crate::db::{
    format_date, format_datetime, parse_date_column, parse_datetime_column, parse_enum_column,
    parse_string_list_column,
};
use crate::domain::booking::{
    Booking, BookingPackage, BookingUser, BookingWithDetails, BookingWithPackage,
};
use crate::domain::package::PackageSummary;
use crate::domain::stats::BookingStatRow;
use crate::domain::types::{BookingStatus, PaymentStatus};
use crate::repository::availability_repo::{claim_slot, count_slots, release_slot};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const BOOKING_COLUMNS: &str = "b.id, b.booking_reference, b.user_id, b.package_id, b.start_date, \
     b.group_size, b.total_amount, b.special_requests, b.status, b.payment_status, b.payment_id, \
     b.created_at, b.updated_at";

// BOOKING_COLUMNS 的列数，关联列从这里开始
const JOIN_OFFSET: usize = 13;

/// 状态变更结果
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: BookingStatus,
    pub booking: Booking,
    pub slot_released: bool,
}

// ==========================================
// BookingRepository - 预订仓储
// ==========================================
pub struct BookingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookingRepository {
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

    /// 插入预订；线路有余位日历时，
    /// 同时占用 `start_date` 当天的一个名额
    ///
    /// # 返回
    /// - Ok(true): 已占位
    /// - Ok(false): 线路没有日历，未占位
    ///
    /// # 错误
    /// - `SlotUnavailable`: 日历在该日期没有开放名额；
    ///   不写入任何数据
    pub fn create_with_slot(&self, booking: &Booking) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let has_calendar = count_slots(&tx, &booking.package_id)? > 0;
        if has_calendar {
            claim_slot(&tx, &booking.package_id, booking.start_date)?;
        }
        insert_booking(&tx, booking)?;
        tx.commit()?;

        tracing::info!(
            booking_id = %booking.id,
            package_id = %booking.package_id,
            start_date = %booking.start_date,
            slot_claimed = has_calendar,
            "booking created"
        );
        Ok(has_calendar)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;
        find_booking(&conn, id)
    }

    /// 用户的预订及线路摘要，按创建时间倒序
    pub fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<BookingWithPackage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, p.id, p.title, p.location, p.duration, p.difficulty, p.price,
                    p.images_json, p.rating, p.total_reviews
             FROM bookings b
             LEFT JOIN trek_packages p ON p.id = b.package_id
             WHERE b.user_id = ?1
             ORDER BY b.created_at DESC, b.rowid DESC",
            BOOKING_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                let booking = map_booking_row(row)?;
                let package = match row.get::<_, Option<String>>(JOIN_OFFSET)? {
                    Some(id) => Some(PackageSummary {
                        id,
                        title: row.get(JOIN_OFFSET + 1)?,
                        location: row.get(JOIN_OFFSET + 2)?,
                        duration: row.get(JOIN_OFFSET + 3)?,
                        difficulty: parse_enum_column(
                            JOIN_OFFSET + 4,
                            &row.get::<_, String>(JOIN_OFFSET + 4)?,
                        )?,
                        price: row.get(JOIN_OFFSET + 5)?,
                        images: parse_string_list_column(
                            JOIN_OFFSET + 6,
                            &row.get::<_, String>(JOIN_OFFSET + 6)?,
                        )?,
                        rating: row.get(JOIN_OFFSET + 7)?,
                        total_reviews: row.get(JOIN_OFFSET + 8)?,
                    }),
                    None => None,
                };
                Ok(BookingWithPackage { booking, package })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 全部预订及客户、线路详情，按创建时间倒序
    pub fn list_detailed(&self) -> RepositoryResult<Vec<BookingWithDetails>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&detailed_sql("ORDER BY b.created_at DESC, b.rowid DESC"))?;
        let rows = stmt
            .query_map([], map_detailed_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_detailed(&self, id: &str) -> RepositoryResult<Option<BookingWithDetails>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(&detailed_sql("WHERE b.id = ?1"), params![id], map_detailed_row)
            .optional()?;
        Ok(row)
    }

    /// 将预订转到 `next`；持有名额的预订被取消时
    /// 释放名额
    ///
    /// # 参数
    /// - `payment_id`: 提供时写入，并将 payment_status 置为 completed
    ///
    /// # 错误
    /// - `NotFound`: 预订不存在
    /// - `InvalidStateTransition`: 生命周期不允许该转换
    /// - `BusinessRuleViolation`: 对已取消或已完成的预订记录支付
    pub fn update_status(
        &self,
        id: &str,
        next: BookingStatus,
        payment_id: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<StatusChange> {
        self.apply_status(id, None, next, payment_id, now)
    }

    /// 同 `update_status`，但仅在预订仍处于 `expected` 时生效。
    /// 检查与写入在同一个 IMMEDIATE 事务中
    ///
    /// # 错误
    /// - `BusinessRuleViolation`: 预订已不处于 `expected`
    pub fn update_status_if(
        &self,
        id: &str,
        expected: BookingStatus,
        next: BookingStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<StatusChange> {
        self.apply_status(id, Some(expected), next, None, now)
    }

    fn apply_status(
        &self,
        id: &str,
        expected: Option<BookingStatus>,
        next: BookingStatus,
        payment_id: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<StatusChange> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut booking = find_booking(&tx, id)?.ok_or_else(|| RepositoryError::not_found("Booking", id))?;
        let previous = booking.status;

        if let Some(expected) = expected {
            if previous != expected {
                return Err(RepositoryError::BusinessRuleViolation(format!(
                    "booking {} is {}, expected {}",
                    id, previous, expected
                )));
            }
        }

        if payment_id.is_some() && (previous.is_terminal() || next == BookingStatus::Cancelled) {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "cannot record a payment on a {} booking",
                if previous.is_terminal() { previous } else { next }
            )));
        }

        if !previous.can_transition_to(next) {
            return Err(RepositoryError::InvalidStateTransition {
                from: previous.to_string(),
                to: next.to_string(),
            });
        }

        if previous == next && payment_id.is_none() {
            return Ok(StatusChange {
                previous,
                booking,
                slot_released: false,
            });
        }

        booking.status = next;
        booking.updated_at = now;
        if let Some(pid) = payment_id {
            booking.payment_id = Some(pid.to_string());
            booking.payment_status = PaymentStatus::Completed;
        }

        tx.execute(
            "UPDATE bookings SET status = ?2, payment_status = ?3, payment_id = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                booking.status.as_str(),
                booking.payment_status.as_str(),
                booking.payment_id,
                format_datetime(now),
            ],
        )?;

        let slot_released = if next == BookingStatus::Cancelled && previous.holds_slot() {
            release_slot(&tx, &booking.package_id, booking.start_date)?
        } else {
            false
        };

        tx.commit()?;
        Ok(StatusChange {
            previous,
            booking,
            slot_released,
        })
    }

    /// 每条预订的状态、金额与创建时间
    pub fn list_stat_rows(&self) -> RepositoryResult<Vec<BookingStatRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT status, total_amount, created_at FROM bookings")?;
        let rows = stmt
            .query_map([], map_stat_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_stat_rows_for_user(&self, user_id: &str) -> RepositoryResult<Vec<BookingStatRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, total_amount, created_at FROM bookings WHERE user_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![user_id], map_stat_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        booking_reference: row.get(1)?,
        user_id: row.get(2)?,
        package_id: row.get(3)?,
        start_date: parse_date_column(4, &row.get::<_, String>(4)?)?,
        group_size: row.get(5)?,
        total_amount: row.get(6)?,
        special_requests: row.get(7)?,
        status: parse_enum_column(8, &row.get::<_, String>(8)?)?,
        payment_status: parse_enum_column(9, &row.get::<_, String>(9)?)?,
        payment_id: row.get(10)?,
        created_at: parse_datetime_column(11, &row.get::<_, String>(11)?)?,
        updated_at: parse_datetime_column(12, &row.get::<_, String>(12)?)?,
    })
}

fn map_stat_row(row: &Row) -> rusqlite::Result<BookingStatRow> {
    Ok(BookingStatRow {
        status: parse_enum_column(0, &row.get::<_, String>(0)?)?,
        total_amount: row.get(1)?,
        created_at: parse_datetime_column(2, &row.get::<_, String>(2)?)?,
    })
}

fn detailed_sql(tail: &str) -> String {
    format!(
        "SELECT {}, u.id, u.name, u.email, u.phone,
                p.id, p.title, p.location, p.duration, p.difficulty, p.price
         FROM bookings b
         JOIN profiles u ON u.id = b.user_id
         JOIN trek_packages p ON p.id = b.package_id
         {}",
        BOOKING_COLUMNS, tail
    )
}

fn map_detailed_row(row: &Row) -> rusqlite::Result<BookingWithDetails> {
    let o = JOIN_OFFSET;
    Ok(BookingWithDetails {
        booking: map_booking_row(row)?,
        user: BookingUser {
            id: row.get(o)?,
            name: row.get(o + 1)?,
            email: row.get(o + 2)?,
            phone: row.get(o + 3)?,
        },
        package: BookingPackage {
            id: row.get(o + 4)?,
            title: row.get(o + 5)?,
            location: row.get(o + 6)?,
            duration: row.get(o + 7)?,
            difficulty: parse_enum_column(o + 8, &row.get::<_, String>(o + 8)?)?,
            price: row.get(o + 9)?,
        },
    })
}

fn find_booking(conn: &Connection, id: &str) -> RepositoryResult<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {} FROM bookings b WHERE b.id = ?1", BOOKING_COLUMNS),
            params![id],
            map_booking_row,
        )
        .optional()?;
    Ok(booking)
}

fn insert_booking(conn: &Connection, booking: &Booking) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO bookings (
            id, booking_reference, user_id, package_id, start_date,
            group_size, total_amount, special_requests, status, payment_status,
            payment_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        params![
            booking.id,
            booking.booking_reference,
            booking.user_id,
            booking.package_id,
            format_date(booking.start_date),
            booking.group_size,
            booking.total_amount,
            booking.special_requests,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.payment_id,
            format_datetime(booking.created_at),
            format_datetime(booking.updated_at),
        ],
    )?;
    Ok(())
}
