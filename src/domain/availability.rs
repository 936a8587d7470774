// ==========================================
// 徒步旅行预订系统 - 余位领域模型
// ==========================================
// 每个 (线路, 日期) 一行：该日期可接受多少预订，
// 以及已占用多少
// 不变量: 0 <= current_bookings <= max_bookings
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// AvailabilitySlot - 余位
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: String,
    pub package_id: String,
    pub available_date: NaiveDate,
    pub max_bookings: i32,
    pub current_bookings: i32,
    pub is_available: bool, // 管理员开关，与容量无关
    pub created_at: NaiveDateTime,
}

impl AvailabilitySlot {
    /// 新建开放余位，尚无预订
    pub fn new_open(package_id: &str, available_date: NaiveDate, max_bookings: i32, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            package_id: package_id.to_string(),
            available_date,
            max_bookings,
            current_bookings: 0,
            is_available: true,
            created_at: now,
        }
    }
}

/// 管理后台余位页面提交的局部更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub max_bookings: Option<i32>,
    pub is_available: Option<bool>,
}

impl SlotUpdate {
    pub fn is_empty(&self) -> bool {
        self.max_bookings.is_none() && self.is_available.is_none()
    }
}

// ==========================================
// Trait: SlotCapacity - 容量检查
// ==========================================
// 供余位引擎与预订流程使用
pub trait SlotCapacity {
    /// 该日期剩余可接受的预订数
    fn remaining(&self) -> i32;

    /// `current_bookings < max_bookings`
    fn has_capacity(&self) -> bool;

    /// 开放、非过去日期且未满
    fn is_bookable_on(&self, today: NaiveDate) -> bool;
}

impl SlotCapacity for AvailabilitySlot {
    fn remaining(&self) -> i32 {
        (self.max_bookings - self.current_bookings).max(0)
    }

    fn has_capacity(&self) -> bool {
        self.current_bookings < self.max_bookings
    }

    fn is_bookable_on(&self, today: NaiveDate) -> bool {
        self.is_available && self.available_date >= today && self.has_capacity()
    }
}
