// ==========================================
// 徒步旅行预订系统 - 管理后台 API
// ==========================================
// 后台功能：全部预订、状态变更（可选通知客户）、
// 仪表盘指标与线路管理
// 调用方需先通过 AuthApi::require_admin
// ==========================================

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::domain::activity::ActivityType;
use crate::domain::booking::{Booking, BookingWithDetails};
use crate::domain::package::{PackageDraft, TrekPackage};
use crate::domain::stats::AdminStats;
use crate::domain::types::BookingStatus;
use crate::engine::StatsEngine;
use crate::messaging::{ConfirmationOutcome, MessagingService};
use crate::repository::{ActivityRepository, BookingRepository, PackageRepository, UserRepository};

/// 管理后台预订列表筛选条件。空字段匹配全部
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl FromStr for PackageStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown package status filter: {}", other)),
        }
    }
}

/// 管理员状态变更结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub booking: Booking,
    pub slot_released: bool,
    /// 尝试发送确认消息时才有值
    pub notification: Option<ConfirmationOutcome>,
}

pub struct AdminApi {
    booking_repo: Arc<BookingRepository>,
    package_repo: Arc<PackageRepository>,
    user_repo: Arc<UserRepository>,
    activity_repo: Arc<ActivityRepository>,
    messaging: Arc<MessagingService>,
}

impl AdminApi {
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        package_repo: Arc<PackageRepository>,
        user_repo: Arc<UserRepository>,
        activity_repo: Arc<ActivityRepository>,
        messaging: Arc<MessagingService>,
    ) -> Self {
        Self {
            booking_repo,
            package_repo,
            user_repo,
            activity_repo,
            messaging,
        }
    }

    // ==========================================
    // 预订
    // ==========================================

    /// 全部预订及客户、线路信息，按创建时间倒序
    pub fn get_all_bookings_detailed(&self) -> ApiResult<Vec<BookingWithDetails>> {
        Ok(self.booking_repo.list_detailed()?)
    }

    pub fn search_bookings(&self, query: &BookingQuery) -> ApiResult<Vec<BookingWithDetails>> {
        let term = query.search.as_deref().unwrap_or("");
        Ok(self
            .booking_repo
            .list_detailed()?
            .into_iter()
            .filter(|b| query.status.map_or(true, |s| b.booking.status == s))
            .filter(|b| b.matches_search(term))
            .collect())
    }

    /// 推进预订生命周期
    ///
    /// # 参数
    /// - `payment_id`: 提供时将支付标记为已完成
    ///
    /// # 错误
    /// - `NotFound`: 预订不存在
    /// - `InvalidStateTransition`: 例如 completed -> pending
    pub fn update_booking_status(
        &self,
        admin_id: &str,
        booking_id: &str,
        status: BookingStatus,
        payment_id: Option<&str>,
    ) -> ApiResult<BookingStatusUpdate> {
        let change = self.booking_repo.update_status(
            booking_id,
            status,
            payment_id,
            chrono::Local::now().naive_local(),
        )?;

        if change.previous != change.booking.status {
            info!(
                booking_id,
                from = %change.previous,
                to = %change.booking.status,
                slot_released = change.slot_released,
                "booking status changed"
            );
            record_activity(
                &self.activity_repo,
                admin_id,
                ActivityType::AdminBookingStatus,
                None,
                Some(json!({
                    "booking_id": booking_id,
                    "from": change.previous.as_str(),
                    "to": change.booking.status.as_str(),
                })),
            );
        }

        Ok(BookingStatusUpdate {
            booking: change.booking,
            slot_released: change.slot_released,
            notification: None,
        })
    }

    /// 状态变更；预订变为 confirmed 时随后发送确认消息。
    /// 通知失败不会撤销状态变更
    pub async fn update_booking_status_with_notification(
        &self,
        admin_id: &str,
        booking_id: &str,
        status: BookingStatus,
        payment_id: Option<&str>,
        send_notification: bool,
    ) -> ApiResult<BookingStatusUpdate> {
        let mut update = self.update_booking_status(admin_id, booking_id, status, payment_id)?;

        if send_notification && status == BookingStatus::Confirmed {
            match self.messaging.send_booking_confirmation(booking_id).await {
                Ok(outcome) => update.notification = Some(outcome),
                Err(e) => warn!(booking_id, error = %e, "booking confirmation not sent"),
            }
        }
        Ok(update)
    }

    // ==========================================
    // 仪表盘
    // ==========================================

    pub fn get_admin_stats(&self) -> ApiResult<AdminStats> {
        let rows = self.booking_repo.list_stat_rows()?;
        Ok(StatsEngine::admin_stats(
            &rows,
            self.package_repo.count_active()?,
            self.user_repo.count_all()?,
            chrono::Local::now().naive_local(),
        ))
    }

    // ==========================================
    // 线路
    // ==========================================

    pub fn list_all_packages(
        &self,
        search: Option<&str>,
        status: PackageStatusFilter,
    ) -> ApiResult<Vec<TrekPackage>> {
        let term = search.unwrap_or("").trim().to_lowercase();
        Ok(self
            .package_repo
            .list_all()?
            .into_iter()
            .filter(|p| match status {
                PackageStatusFilter::All => true,
                PackageStatusFilter::Active => p.is_active,
                PackageStatusFilter::Inactive => !p.is_active,
            })
            .filter(|p| {
                term.is_empty()
                    || p.title.to_lowercase().contains(&term)
                    || p.location.to_lowercase().contains(&term)
            })
            .collect())
    }

    /// # 错误
    /// - `InvalidInput`: 第一条未通过的草稿规则
    pub fn create_trek_package(&self, admin_id: &str, draft: PackageDraft) -> ApiResult<TrekPackage> {
        let draft = checked_draft(draft)?;
        let now = chrono::Local::now().naive_local();
        let package = TrekPackage {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            duration: draft.duration,
            difficulty: draft.difficulty,
            price: draft.price,
            max_group_size: draft.max_group_size,
            images: draft.images,
            itinerary: draft.itinerary,
            included: draft.included,
            excluded: draft.excluded,
            is_active: true,
            rating: None,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.package_repo.insert(&package)?;
        self.log_package_change(admin_id, &package.id, "created");
        Ok(package)
    }

    /// 替换可编辑字段；评分、评价数与上架状态保持不变
    pub fn update_trek_package(&self, admin_id: &str, id: &str, draft: PackageDraft) -> ApiResult<TrekPackage> {
        let draft = checked_draft(draft)?;
        let mut package = self
            .package_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("TrekPackage (id={})", id)))?;

        package.title = draft.title;
        package.description = draft.description;
        package.location = draft.location;
        package.duration = draft.duration;
        package.difficulty = draft.difficulty;
        package.price = draft.price;
        package.max_group_size = draft.max_group_size;
        package.images = draft.images;
        package.itinerary = draft.itinerary;
        package.included = draft.included;
        package.excluded = draft.excluded;
        package.updated_at = chrono::Local::now().naive_local();

        self.package_repo.update(&package)?;
        self.log_package_change(admin_id, id, "updated");
        Ok(package)
    }

    /// # 错误
    /// - `BusinessRuleViolation`: 仍有预订引用该线路
    pub fn delete_trek_package(&self, admin_id: &str, id: &str) -> ApiResult<()> {
        self.package_repo.delete(id)?;
        self.log_package_change(admin_id, id, "deleted");
        Ok(())
    }

    pub fn toggle_package_status(&self, admin_id: &str, id: &str, is_active: bool) -> ApiResult<()> {
        self.package_repo
            .set_active(id, is_active, chrono::Local::now().naive_local())?;
        self.log_package_change(admin_id, id, if is_active { "activated" } else { "deactivated" });
        Ok(())
    }

    fn log_package_change(&self, admin_id: &str, package_id: &str, action: &str) {
        info!(package_id, action, "package changed");
        record_activity(
            &self.activity_repo,
            admin_id,
            ActivityType::AdminPackageChange,
            None,
            Some(json!({ "package_id": package_id, "action": action })),
        );
    }
}

fn checked_draft(draft: PackageDraft) -> ApiResult<PackageDraft> {
    let draft = draft.normalized();
    match draft.validation_error() {
        Some(reason) => Err(ApiError::InvalidInput(reason)),
        None => Ok(draft),
    }
}
