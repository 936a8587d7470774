// ==========================================
// 徒步旅行预订系统 - 用户 API
// ==========================================
// 资料读取/更新、资料统计、活动历史
// ==========================================

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::auth::validation::{validate_name, validate_optional_phone};
use crate::config::ConfigManager;
use crate::domain::activity::{ActivityType, UserActivity};
use crate::domain::user::{ProfileUpdate, UserDashboard, UserProfile, UserProfileWithStats};
use crate::engine::StatsEngine;
use crate::repository::{ActivityRepository, BookingRepository, UserRepository};

/// 资料仪表盘显示的最近条目数
pub const DASHBOARD_ACTIVITY_LIMIT: usize = 10;

/// 写入一条活动记录。失败只记日志，不向上返回
pub(crate) fn record_activity(
    activity_repo: &ActivityRepository,
    user_id: &str,
    activity_type: ActivityType,
    description: Option<String>,
    metadata: Option<JsonValue>,
) {
    let activity = UserActivity::new(user_id, activity_type, description, metadata);
    if let Err(e) = activity_repo.insert(&activity) {
        warn!(user_id, activity = activity_type.as_str(), error = %e, "failed to log user activity");
    }
}

pub struct UserApi {
    user_repo: Arc<UserRepository>,
    booking_repo: Arc<BookingRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl UserApi {
    pub fn new(
        user_repo: Arc<UserRepository>,
        booking_repo: Arc<BookingRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            user_repo,
            booking_repo,
            activity_repo,
            config,
        }
    }

    pub fn get_user_profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("UserProfile (id={})", user_id)))
    }

    /// 应用资料更新，并记录修改了哪些字段
    ///
    /// 空字符串清空可选文本字段。姓名不可清空
    pub fn update_user_profile_with_logging(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> ApiResult<UserProfile> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        validate_optional_phone(update.phone.as_deref())?;

        let mut profile = self.get_user_profile(user_id)?;
        let fields = update.updated_fields();
        if fields.is_empty() {
            return Ok(profile);
        }

        let cleared = |value: String| {
            let trimmed = value.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };
        if let Some(name) = update.name {
            profile.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            profile.phone = cleared(phone);
        }
        if let Some(avatar_url) = update.avatar_url {
            profile.avatar_url = cleared(avatar_url);
        }
        if let Some(bio) = update.bio {
            profile.bio = cleared(bio);
        }
        if let Some(dob) = update.date_of_birth {
            profile.date_of_birth = Some(dob);
        }
        if let Some(contact) = update.emergency_contact {
            profile.emergency_contact = cleared(contact);
        }
        if let Some(preferences) = update.preferences {
            profile.preferences = Some(preferences);
        }
        profile.updated_at = chrono::Local::now().naive_local();

        self.user_repo.update_profile(&profile)?;
        debug!(user_id, ?fields, "profile updated");

        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::ProfileUpdate,
            Some("Profile information updated".to_string()),
            Some(json!({ "updated_fields": fields })),
        );
        Ok(profile)
    }

    pub fn get_user_profile_with_stats(&self, user_id: &str) -> ApiResult<UserProfileWithStats> {
        let profile = self.get_user_profile(user_id)?;
        let rows = self.booking_repo.list_stat_rows_for_user(user_id)?;
        let booking_stats = StatsEngine::user_booking_stats(&rows);
        let mut activity_stats = self.activity_repo.stats(user_id)?;
        activity_stats.registration_date = Some(profile.created_at);

        Ok(UserProfileWithStats {
            profile,
            booking_stats,
            activity_stats,
        })
    }

    /// 按时间倒序；`limit` 默认取 `activity.default_history_limit`
    pub fn get_user_activity_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> ApiResult<Vec<UserActivity>> {
        let limit = match limit {
            Some(limit) => limit,
            None => self.config.activity_history_limit().map_err(ApiError::config)?,
        };
        Ok(self.activity_repo.list_recent(user_id, limit)?)
    }

    pub fn get_user_dashboard_stats(&self, user_id: &str) -> ApiResult<UserDashboard> {
        let profile_with_stats = self.get_user_profile_with_stats(user_id)?;
        let recent_activity = self
            .activity_repo
            .list_recent(user_id, DASHBOARD_ACTIVITY_LIMIT)?;
        Ok(UserDashboard {
            profile_with_stats,
            recent_activity,
        })
    }

    /// 前端显式提交的活动记录。与内部记录不同，
    /// 存储失败会返回给调用方
    pub fn log_user_activity(
        &self,
        user_id: &str,
        activity_type: ActivityType,
        description: Option<String>,
        metadata: Option<JsonValue>,
    ) -> ApiResult<UserActivity> {
        let activity = UserActivity::new(user_id, activity_type, description, metadata);
        self.activity_repo.insert(&activity)?;
        Ok(activity)
    }
}
