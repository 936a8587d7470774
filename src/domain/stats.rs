// ==========================================
// 徒步旅行预订系统 - 仪表盘统计
// ==========================================

use serde::{Deserialize, Serialize};

/// 管理后台仪表盘核心指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_bookings: i64,
    pub total_revenue: f64, // confirmed + completed 合计
    pub total_packages: i64, // 仅上架
    pub total_users: i64,
    pub monthly_bookings: i64, // 本月 1 日以来创建
    pub pending_bookings: i64,
}

/// 仪表盘聚合所需的预订字段
#[derive(Debug, Clone, PartialEq)]
pub struct BookingStatRow {
    pub status: crate::domain::types::BookingStatus,
    pub total_amount: f64,
    pub created_at: chrono::NaiveDateTime,
}
