// ==========================================
// 徒步旅行预订系统 - 预订 API
// ==========================================
// 客户侧的预订生命周期：按日期创建、
// 查看自己的预订、待确认时取消
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::domain::activity::ActivityType;
use crate::domain::booking::{Booking, BookingWithPackage, NewBookingRequest};
use crate::domain::types::BookingStatus;
use crate::engine::{AvailabilityRules, PricingRules};
use crate::perf::timed;
use crate::repository::{ActivityRepository, BookingRepository, PackageRepository};

pub struct BookingApi {
    package_repo: Arc<PackageRepository>,
    booking_repo: Arc<BookingRepository>,
    activity_repo: Arc<ActivityRepository>,
}

impl BookingApi {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        booking_repo: Arc<BookingRepository>,
        activity_repo: Arc<ActivityRepository>,
    ) -> Self {
        Self {
            package_repo,
            booking_repo,
            activity_repo,
        }
    }

    /// 为所选出发日期创建待确认预订
    ///
    /// 占位与插入预订一起提交；线路有日历时
    /// 该日期必须还有剩余名额
    ///
    /// # 错误
    /// - `NotFound`: 线路不存在或未上架
    /// - `InvalidInput`: 人数超出范围、日期已过
    /// - `DateUnavailable`: 该日期已关闭、已满或未开放
    pub fn create_booking(&self, user_id: &str, request: NewBookingRequest) -> ApiResult<Booking> {
        let package = self
            .package_repo
            .find_by_id(&request.package_id)?
            .ok_or_else(|| ApiError::NotFound(format!("TrekPackage (id={})", request.package_id)))?;

        let now = chrono::Local::now().naive_local();
        AvailabilityRules::validate_booking_request(&package, &request, now.date())?;

        let total_amount = PricingRules::quote(package.price, request.group_size);
        let booking = Booking::new_pending(
            user_id.to_string(),
            package.id.clone(),
            request.start_date,
            request.group_size,
            total_amount,
            request.special_requests,
            now,
        );
        let slot_claimed = timed("create_booking", || self.booking_repo.create_with_slot(&booking))?;

        info!(
            booking_id = %booking.id,
            reference = %booking.booking_reference,
            package_id = %booking.package_id,
            start_date = %booking.start_date,
            slot_claimed,
            "booking created"
        );
        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::BookingCreated,
            Some(format!("Booked {}", package.title)),
            Some(json!({
                "booking_id": booking.id,
                "package_id": booking.package_id,
                "start_date": booking.start_date,
                "group_size": booking.group_size,
                "total_amount": booking.total_amount,
            })),
        );
        Ok(booking)
    }

    /// 按创建时间倒序，附带线路摘要
    pub fn get_user_bookings(&self, user_id: &str) -> ApiResult<Vec<BookingWithPackage>> {
        Ok(self.booking_repo.list_by_user(user_id)?)
    }

    /// 他人的预订按不存在处理
    pub fn get_booking(&self, user_id: &str, booking_id: &str) -> ApiResult<Booking> {
        self.booking_repo
            .find_by_id(booking_id)?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("Booking (id={})", booking_id)))
    }

    /// 客户只能取消待确认的预订
    pub fn cancel_booking(&self, user_id: &str, booking_id: &str) -> ApiResult<Booking> {
        let booking = self.get_booking(user_id, booking_id)?;
        if booking.status != BookingStatus::Pending {
            return Err(ApiError::BusinessRuleViolation(format!(
                "only pending bookings can be cancelled, booking is {}",
                booking.status
            )));
        }

        let change = timed("cancel_booking", || {
            self.booking_repo.update_status_if(
                booking_id,
                BookingStatus::Pending,
                BookingStatus::Cancelled,
                chrono::Local::now().naive_local(),
            )
        })?;
        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::BookingCancelled,
            None,
            Some(json!({ "booking_id": booking_id, "slot_released": change.slot_released })),
        );
        Ok(change.booking)
    }
}
