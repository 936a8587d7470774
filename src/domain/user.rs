// ==========================================
// 徒步旅行预订系统 - 用户领域模型
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::activity::UserActivity;

// ==========================================
// UserProfile - 用户资料
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub preferences: Option<JsonValue>,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 用户可自行修改的资料字段。`None` 表示不修改该字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub preferences: Option<JsonValue>,
}

impl ProfileUpdate {
    /// 本次更新携带的字段名，按声明顺序
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.avatar_url.is_some() {
            fields.push("avatar_url");
        }
        if self.bio.is_some() {
            fields.push("bio");
        }
        if self.date_of_birth.is_some() {
            fields.push("date_of_birth");
        }
        if self.emergency_contact.is_some() {
            fields.push("emergency_contact");
        }
        if self.preferences.is_some() {
            fields.push("preferences");
        }
        fields
    }
}

// ==========================================
// 认证输入 / 会话
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInData {
    pub email: String,
    pub password: String,
}

/// 登录时签发；后续调用凭 token 认证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub expires_at: NaiveDateTime,
}

// ==========================================
// 个人资料统计
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBookingStats {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub pending_bookings: i64,
    pub total_spent: f64,
    pub last_booking_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total_activities: i64,
    pub last_activity: Option<NaiveDateTime>,
    pub registration_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileWithStats {
    pub profile: UserProfile,
    pub booking_stats: UserBookingStats,
    pub activity_stats: ActivityStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDashboard {
    #[serde(flatten)]
    pub profile_with_stats: UserProfileWithStats,
    pub recent_activity: Vec<UserActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updated_fields() {
        let update = ProfileUpdate {
            name: Some("Asha".to_string()),
            bio: Some("Hiker".to_string()),
            ..Default::default()
        };
        assert_eq!(update.updated_fields(), vec!["name", "bio"]);
        assert!(ProfileUpdate::default().updated_fields().is_empty());
    }
}
