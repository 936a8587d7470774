// ==========================================
// 徒步旅行预订系统 - 仪表盘聚合
// ==========================================
// 收入与消费只统计 confirmed + completed 预订
// ==========================================

use crate::domain::stats::{AdminStats, BookingStatRow};
use crate::domain::types::BookingStatus;
use crate::domain::user::UserBookingStats;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub struct StatsEngine;

impl StatsEngine {
    /// `now` 所在月份第一天的零点
    pub fn month_start(now: NaiveDateTime) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(now)
    }

    pub fn admin_stats(
        rows: &[BookingStatRow],
        active_packages: i64,
        total_users: i64,
        now: NaiveDateTime,
    ) -> AdminStats {
        let month_start = Self::month_start(now);
        AdminStats {
            total_bookings: rows.len() as i64,
            total_revenue: rows
                .iter()
                .filter(|r| r.status.is_revenue())
                .map(|r| r.total_amount)
                .sum(),
            total_packages: active_packages,
            total_users,
            monthly_bookings: rows.iter().filter(|r| r.created_at >= month_start).count() as i64,
            pending_bookings: rows
                .iter()
                .filter(|r| r.status == BookingStatus::Pending)
                .count() as i64,
        }
    }

    pub fn user_booking_stats(rows: &[BookingStatRow]) -> UserBookingStats {
        let count = |status: BookingStatus| rows.iter().filter(|r| r.status == status).count() as i64;
        UserBookingStats {
            total_bookings: rows.len() as i64,
            confirmed_bookings: count(BookingStatus::Confirmed),
            completed_bookings: count(BookingStatus::Completed),
            pending_bookings: count(BookingStatus::Pending),
            total_spent: rows
                .iter()
                .filter(|r| r.status.is_revenue())
                .map(|r| r.total_amount)
                .sum(),
            last_booking_date: rows.iter().map(|r| r.created_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn row(status: BookingStatus, amount: f64, created: NaiveDateTime) -> BookingStatRow {
        BookingStatRow {
            status,
            total_amount: amount,
            created_at: created,
        }
    }

    fn rows() -> Vec<BookingStatRow> {
        vec![
            row(BookingStatus::Confirmed, 10000.0, ts(3, 2)),
            row(BookingStatus::Completed, 5000.0, ts(2, 20)),
            row(BookingStatus::Pending, 7000.0, ts(3, 1)),
            row(BookingStatus::Cancelled, 9000.0, ts(3, 5)),
        ]
    }

    #[test]
    fn test_admin_stats() {
        let stats = StatsEngine::admin_stats(&rows(), 6, 12, ts(3, 15));
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.total_revenue, 15000.0);
        assert_eq!(stats.monthly_bookings, 3);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.total_packages, 6);
        assert_eq!(stats.total_users, 12);
    }

    #[test]
    fn test_user_booking_stats() {
        let stats = StatsEngine::user_booking_stats(&rows());
        assert_eq!(stats.confirmed_bookings, 1);
        assert_eq!(stats.completed_bookings, 1);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.total_spent, 15000.0);
        assert_eq!(stats.last_booking_date, Some(ts(3, 5)));

        let empty = StatsEngine::user_booking_stats(&[]);
        assert_eq!(empty.total_bookings, 0);
        assert_eq!(empty.last_booking_date, None);
    }

    #[test]
    fn test_month_start() {
        assert_eq!(
            StatsEngine::month_start(ts(3, 15)),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }
}
