// ==========================================
// 徒步旅行预订系统 - 用户活动日志
// ==========================================
// 用户操作的审计记录（资料修改、预订、会话）
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: String,
    pub user_id: String,
    pub activity_type: String, // 以字符串存储，取值见 ActivityType
    pub activity_description: Option<String>,
    pub metadata: Option<JsonValue>,
    pub created_at: NaiveDateTime,
}

impl UserActivity {
    pub fn new(
        user_id: &str,
        activity_type: ActivityType,
        description: Option<String>,
        metadata: Option<JsonValue>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            activity_type: activity_type.as_str().to_string(),
            activity_description: description,
            metadata,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}

// ==========================================
// ActivityType - 活动类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    SignUp,
    SignIn,
    SignOut,
    ProfileUpdate,
    PasswordChange,
    SessionActivity,
    BookingCreated,
    BookingCancelled,
    WishlistAdd,
    WishlistRemove,
    ReviewSubmitted,
    // ===== 管理员操作 =====
    AdminBookingStatus,
    AdminPackageChange,
    AdminAvailabilityChange,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::SignUp => "sign_up",
            ActivityType::SignIn => "sign_in",
            ActivityType::SignOut => "sign_out",
            ActivityType::ProfileUpdate => "profile_update",
            ActivityType::PasswordChange => "password_change",
            ActivityType::SessionActivity => "session_activity",
            ActivityType::BookingCreated => "booking_created",
            ActivityType::BookingCancelled => "booking_cancelled",
            ActivityType::WishlistAdd => "wishlist_add",
            ActivityType::WishlistRemove => "wishlist_remove",
            ActivityType::ReviewSubmitted => "review_submitted",
            ActivityType::AdminBookingStatus => "admin_booking_status",
            ActivityType::AdminPackageChange => "admin_package_change",
            ActivityType::AdminAvailabilityChange => "admin_availability_change",
        }
    }
}
