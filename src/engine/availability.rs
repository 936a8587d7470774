// ==========================================
// 徒步旅行预订系统 - 余位规则
// ==========================================
// 纯函数：无 I/O，无 SQL。每个拒绝都附带原因
// ==========================================

use crate::domain::availability::{AvailabilitySlot, SlotCapacity};
use crate::domain::booking::NewBookingRequest;
use crate::domain::package::TrekPackage;
use chrono::NaiveDate;
use thiserror::Error;

/// 预订请求在访问存储之前被拒绝的原因
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingRejection {
    #[error("package {0} is not open for booking")]
    PackageInactive(String),

    #[error("group size {requested} is outside 1..={max}")]
    GroupSizeOutOfRange { requested: i32, max: i32 },

    #[error("start date {0} is in the past")]
    DateInPast(NaiveDate),
}

/// 新余位无法创建的原因
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlotRejection {
    #[error("date {0} is in the past")]
    DateInPast(NaiveDate),

    #[error("max_bookings must be at least 1, got {0}")]
    InvalidMaxBookings(i32),
}

pub struct AvailabilityRules;

impl AvailabilityRules {
    /// 客户可选的日期，升序且不重复
    ///
    /// 日期入选条件：余位开放、不早于 `today`，
    /// 且 `current_bookings < max_bookings`
    pub fn bookable_dates(slots: &[AvailabilitySlot], today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = slots
            .iter()
            .filter(|s| s.is_bookable_on(today))
            .map(|s| s.available_date)
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// 不依赖日历的检查
    pub fn validate_booking_request(
        package: &TrekPackage,
        request: &NewBookingRequest,
        today: NaiveDate,
    ) -> Result<(), BookingRejection> {
        if !package.is_active {
            return Err(BookingRejection::PackageInactive(package.id.clone()));
        }
        if request.group_size < 1 || request.group_size > package.max_group_size {
            return Err(BookingRejection::GroupSizeOutOfRange {
                requested: request.group_size,
                max: package.max_group_size,
            });
        }
        if request.start_date < today {
            return Err(BookingRejection::DateInPast(request.start_date));
        }
        Ok(())
    }

    pub fn validate_new_slot(
        date: NaiveDate,
        max_bookings: i32,
        today: NaiveDate,
    ) -> Result<(), SlotRejection> {
        if date < today {
            return Err(SlotRejection::DateInPast(date));
        }
        if max_bookings < 1 {
            return Err(SlotRejection::InvalidMaxBookings(max_bookings));
        }
        Ok(())
    }
}
