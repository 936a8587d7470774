// ==========================================
// 徒步旅行预订系统 - 余位 API
// ==========================================
// 线路按日期的容量：客户可选哪些日期、
// 管理员维护日历与批量导入
// 不变量: 0 <= current_bookings <= max_bookings
// ==========================================

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::config::ConfigManager;
use crate::domain::activity::ActivityType;
use crate::domain::availability::{AvailabilitySlot, SlotUpdate};
use crate::engine::AvailabilityRules;
use crate::importer::{CalendarImporter, ImportReport};
use crate::repository::{ActivityRepository, AvailabilityRepository, PackageRepository};

pub struct AvailabilityApi {
    package_repo: Arc<PackageRepository>,
    availability_repo: Arc<AvailabilityRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
    importer: CalendarImporter,
}

impl AvailabilityApi {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        availability_repo: Arc<AvailabilityRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        let importer = CalendarImporter::new(package_repo.clone(), availability_repo.clone());
        Self {
            package_repo,
            availability_repo,
            activity_repo,
            config,
            importer,
        }
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn ensure_package(&self, package_id: &str) -> ApiResult<()> {
        if self.package_repo.find_summary(package_id)?.is_none() {
            return Err(ApiError::NotFound(format!("TrekPackage (id={})", package_id)));
        }
        Ok(())
    }

    /// 今天起的余位，按日期升序（管理日历）
    pub fn get_package_availability(&self, package_id: &str) -> ApiResult<Vec<AvailabilitySlot>> {
        Ok(self.availability_repo.list_from(package_id, Self::today())?)
    }

    /// 客户可预订的日期：开放、非过去、未满。升序
    ///
    /// # 错误
    /// - `NotFound`: 线路不存在或未上架
    pub fn get_available_dates(&self, package_id: &str) -> ApiResult<Vec<NaiveDate>> {
        let active = self
            .package_repo
            .find_by_id(package_id)?
            .map(|p| p.is_active)
            .unwrap_or(false);
        if !active {
            return Err(ApiError::NotFound(format!("TrekPackage (id={})", package_id)));
        }
        let today = Self::today();
        let slots = self.availability_repo.list_from(package_id, today)?;
        Ok(AvailabilityRules::bookable_dates(&slots, today))
    }

    /// 开放某日期供预订
    ///
    /// # 参数
    /// - `max_bookings`: 默认取 `availability.default_max_bookings`
    pub fn add_package_availability(
        &self,
        admin_id: &str,
        package_id: &str,
        date: NaiveDate,
        max_bookings: Option<i32>,
    ) -> ApiResult<AvailabilitySlot> {
        self.ensure_package(package_id)?;
        let max_bookings = match max_bookings {
            Some(max) => max,
            None => self.config.default_max_bookings().map_err(ApiError::config)?,
        };
        AvailabilityRules::validate_new_slot(date, max_bookings, Self::today())?;

        let slot = AvailabilitySlot::new_open(package_id, date, max_bookings, chrono::Local::now().naive_local());
        self.availability_repo.insert(&slot)?;

        info!(package_id, %date, max_bookings, "availability added");
        record_activity(
            &self.activity_repo,
            admin_id,
            ActivityType::AdminAvailabilityChange,
            Some("Availability added".to_string()),
            Some(json!({ "package_id": package_id, "date": date, "max_bookings": max_bookings })),
        );
        Ok(slot)
    }

    pub fn update_package_availability(
        &self,
        admin_id: &str,
        slot_id: &str,
        update: SlotUpdate,
    ) -> ApiResult<AvailabilitySlot> {
        if update.is_empty() {
            return self
                .availability_repo
                .find_by_id(slot_id)?
                .ok_or_else(|| ApiError::NotFound(format!("AvailabilitySlot (id={})", slot_id)));
        }
        let slot = self.availability_repo.update(slot_id, &update)?;
        record_activity(
            &self.activity_repo,
            admin_id,
            ActivityType::AdminAvailabilityChange,
            Some("Availability updated".to_string()),
            Some(json!({
                "slot_id": slot_id,
                "max_bookings": update.max_bookings,
                "is_available": update.is_available,
            })),
        );
        Ok(slot)
    }

    /// # 错误
    /// - `BusinessRuleViolation`: 余位仍有预订占用
    pub fn remove_package_availability(&self, admin_id: &str, slot_id: &str) -> ApiResult<()> {
        self.availability_repo.delete(slot_id)?;
        record_activity(
            &self.activity_repo,
            admin_id,
            ActivityType::AdminAvailabilityChange,
            Some("Availability removed".to_string()),
            Some(json!({ "slot_id": slot_id })),
        );
        Ok(())
    }

    /// 占用某日期的一个预订名额
    ///
    /// # 错误
    /// - `DateUnavailable`: 无余位、已关闭或已满
    pub fn book_package_date(&self, package_id: &str, date: NaiveDate) -> ApiResult<AvailabilitySlot> {
        Ok(self.availability_repo.book_package_date(package_id, date)?)
    }

    /// 归还一个预订名额；不会低于零
    pub fn release_package_date(&self, package_id: &str, date: NaiveDate) -> ApiResult<bool> {
        Ok(self.availability_repo.release_package_date(package_id, date)?)
    }

    /// 批量导入日历文件（.csv / .xlsx / .xls）
    pub fn import_availability<P: AsRef<Path>>(&self, admin_id: &str, file_path: P) -> ApiResult<ImportReport> {
        let default_max = self.config.default_max_bookings().map_err(ApiError::config)?;
        let report = self
            .importer
            .import_from_file(file_path.as_ref(), default_max, chrono::Local::now().naive_local())?;
        record_activity(
            &self.activity_repo,
            admin_id,
            ActivityType::AdminAvailabilityChange,
            Some("Availability imported".to_string()),
            Some(json!({
                "file": file_path.as_ref().display().to_string(),
                "inserted": report.inserted,
                "skipped_duplicates": report.skipped_duplicates,
                "errors": report.errors.len(),
            })),
        );
        Ok(report)
    }
}
