// ==========================================
// 徒步旅行预订系统 - 余位日历导入器
// ==========================================
// 列: package_id, available_date (YYYY-MM-DD), max_bookings
// 流程: 解析 -> 逐行校验 -> 批量插入（跳过重复日期）
// ==========================================

use crate::db::DATE_FORMAT;
use crate::domain::availability::AvailabilitySlot;
use crate::engine::AvailabilityRules;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use crate::repository::{AvailabilityRepository, PackageRepository};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub const COL_PACKAGE_ID: &str = "package_id";
pub const COL_AVAILABLE_DATE: &str = "available_date";
pub const COL_MAX_BOOKINGS: &str = "max_bookings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<RowError>,
}

pub struct CalendarImporter {
    package_repo: Arc<PackageRepository>,
    availability_repo: Arc<AvailabilityRepository>,
}

impl CalendarImporter {
    pub fn new(package_repo: Arc<PackageRepository>, availability_repo: Arc<AvailabilityRepository>) -> Self {
        Self {
            package_repo,
            availability_repo,
        }
    }

    /// 导入日历文件
    ///
    /// # 参数
    /// - `default_max_bookings`: max_bookings 单元格为空时使用
    ///
    /// # 错误
    /// 只返回文件级问题（文件缺失、格式错误、缺少列）
    pub fn import_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        default_max_bookings: i32,
        now: NaiveDateTime,
    ) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        tracing::info!(file = %path.display(), "availability import started");
        let rows = UniversalFileParser.parse(path)?;
        let report = self.import_rows(&rows, default_max_bookings, now)?;
        tracing::info!(
            file = %path.display(),
            total = report.total_rows,
            inserted = report.inserted,
            duplicates = report.skipped_duplicates,
            errors = report.errors.len(),
            "availability import finished"
        );
        Ok(report)
    }

    pub fn import_rows(
        &self,
        rows: &[RawRow],
        default_max_bookings: i32,
        now: NaiveDateTime,
    ) -> ImportResult<ImportReport> {
        if let Some(first) = rows.first() {
            for column in [COL_PACKAGE_ID, COL_AVAILABLE_DATE] {
                if !first.fields.contains_key(column) {
                    return Err(ImportError::MissingColumn(column.to_string()));
                }
            }
        }

        let today = now.date();
        let mut report = ImportReport {
            total_rows: rows.len(),
            ..Default::default()
        };
        let mut known_packages: HashMap<String, bool> = HashMap::new();
        let mut slots = Vec::new();

        for raw in rows {
            match self.slot_from_row(raw, default_max_bookings, today, now, &mut known_packages)? {
                Ok(slot) => slots.push(slot),
                Err(reason) => report.errors.push(RowError { row: raw.row, reason }),
            }
        }

        let outcomes = self.availability_repo.insert_batch(&slots)?;
        report.inserted = outcomes.iter().filter(|inserted| **inserted).count();
        report.skipped_duplicates = outcomes.len() - report.inserted;
        Ok(report)
    }

    /// 外层错误中止导入，内层错误只拒绝该行
    fn slot_from_row(
        &self,
        raw: &RawRow,
        default_max_bookings: i32,
        today: NaiveDate,
        now: NaiveDateTime,
        known_packages: &mut HashMap<String, bool>,
    ) -> ImportResult<Result<AvailabilitySlot, String>> {
        let package_id = raw.get(COL_PACKAGE_ID);
        if package_id.is_empty() {
            return Ok(Err("package_id is empty".to_string()));
        }
        let known = match known_packages.get(package_id) {
            Some(known) => *known,
            None => {
                let known = self.package_repo.find_summary(package_id)?.is_some();
                known_packages.insert(package_id.to_string(), known);
                known
            }
        };
        if !known {
            return Ok(Err(format!("unknown package: {}", package_id)));
        }

        let raw_date = raw.get(COL_AVAILABLE_DATE);
        let date = match NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => return Ok(Err(format!("invalid date '{}', expected YYYY-MM-DD", raw_date))),
        };

        let raw_max = raw.get(COL_MAX_BOOKINGS);
        let max_bookings = if raw_max.is_empty() {
            default_max_bookings
        } else {
            match raw_max.parse::<i32>() {
                Ok(max) => max,
                Err(_) => return Ok(Err(format!("invalid max_bookings '{}'", raw_max))),
            }
        };

        if let Err(rejection) = AvailabilityRules::validate_new_slot(date, max_bookings, today) {
            return Ok(Err(rejection.to_string()));
        }

        Ok(Ok(AvailabilitySlot::new_open(package_id, date, max_bookings, now)))
    }
}
