// ==========================================
// 徒步旅行预订系统 - 预订领域模型
// ==========================================
// 客户针对某条线路某个出发日期的预订
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::package::PackageSummary;
use crate::domain::types::{BookingStatus, Difficulty, PaymentStatus};

// ==========================================
// Booking - 预订
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub booking_reference: String, // 展示给客户的短编号
    pub user_id: String,
    pub package_id: String,
    pub start_date: NaiveDate,
    pub group_size: i32,
    pub total_amount: f64,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// 新建待确认预订，生成新的 id 与预订编号
    pub fn new_pending(
        user_id: String,
        package_id: String,
        start_date: NaiveDate,
        group_size: i32,
        total_amount: f64,
        special_requests: Option<String>,
        now: NaiveDateTime,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let booking_reference = reference_from_id(&id);
        Self {
            id,
            booking_reference,
            user_id,
            package_id,
            start_date,
            group_size,
            total_amount,
            special_requests: special_requests
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 取 id 前八个字符，转大写，去掉连字符
pub fn reference_from_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

// ==========================================
// NewBookingRequest - 客户输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingRequest {
    pub package_id: String,
    pub start_date: NaiveDate,
    pub group_size: i32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

// ==========================================
// 列表视图
// ==========================================

/// 预订附带线路摘要，用于"我的预订"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithPackage {
    #[serde(flatten)]
    pub booking: Booking,
    pub package: Option<PackageSummary>,
}

/// 预订关联客户与线路，用于管理后台
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub user: BookingUser,
    pub package: BookingPackage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPackage {
    pub id: String,
    pub title: String,
    pub location: String,
    pub duration: i32,
    pub difficulty: Difficulty,
    pub price: f64,
}

impl BookingWithDetails {
    /// 不区分大小写匹配客户姓名、线路标题或预订 id
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.user.name.to_lowercase().contains(&term)
            || self.package.title.to_lowercase().contains(&term)
            || self.booking.id.to_lowercase().contains(&term)
            || self.booking.booking_reference.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_id() {
        assert_eq!(
            reference_from_id("3f2a9c1e-77aa-4bcd-9e00-000000000000"),
            "3F2A9C1E"
        );
        assert_eq!(reference_from_id("ab-cd"), "ABCD");
    }

    #[test]
    fn test_new_pending_booking() {
        let now = chrono::Local::now().naive_local();
        let b = Booking::new_pending(
            "u1".to_string(),
            "p1".to_string(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            2,
            17000.0,
            Some("   ".to_string()),
            now,
        );
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.payment_status, PaymentStatus::Pending);
        assert_eq!(b.booking_reference.len(), 8);
        assert!(b.special_requests.is_none());
    }
}
