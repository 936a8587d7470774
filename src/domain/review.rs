// ==========================================
// 徒步旅行预订系统 - 评价 / 心愿单领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::package::PackageSummary;

// ==========================================
// Review - 评价
// ==========================================
// 每个已完成预订一条评价；评分 1..=5
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub package_id: String,
    pub booking_id: String,
    pub rating: i32,
    pub comment: String,
    pub reviewer_name: Option<String>, // 关联自 profiles
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub booking_id: String,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

// ==========================================
// WishlistEntry - 心愿单条目
// ==========================================
// 收藏的线路，与预订状态无关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: String,
    pub user_id: String,
    pub package_id: String,
    pub created_at: NaiveDateTime,
    pub package: Option<PackageSummary>,
}
