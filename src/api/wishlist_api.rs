// ==========================================
// 徒步旅行预订系统 - 心愿单 API
// ==========================================

use std::sync::Arc;

use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::domain::activity::ActivityType;
use crate::domain::review::WishlistEntry;
use crate::repository::{ActivityRepository, PackageRepository, RepositoryError, WishlistRepository};

pub struct WishlistApi {
    wishlist_repo: Arc<WishlistRepository>,
    package_repo: Arc<PackageRepository>,
    activity_repo: Arc<ActivityRepository>,
}

impl WishlistApi {
    pub fn new(
        wishlist_repo: Arc<WishlistRepository>,
        package_repo: Arc<PackageRepository>,
        activity_repo: Arc<ActivityRepository>,
    ) -> Self {
        Self {
            wishlist_repo,
            package_repo,
            activity_repo,
        }
    }

    pub fn get_user_wishlist(&self, user_id: &str) -> ApiResult<Vec<WishlistEntry>> {
        Ok(self.wishlist_repo.list_by_user(user_id)?)
    }

    /// # 错误
    /// - `NotFound`: 线路不存在
    /// - `BusinessRuleViolation`: 已收藏
    pub fn add_to_wishlist(&self, user_id: &str, package_id: &str) -> ApiResult<WishlistEntry> {
        let summary = self
            .package_repo
            .find_summary(package_id)?
            .ok_or_else(|| ApiError::NotFound(format!("TrekPackage (id={})", package_id)))?;

        let entry = WishlistEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            package_id: package_id.to_string(),
            created_at: chrono::Local::now().naive_local(),
            package: Some(summary),
        };
        match self.wishlist_repo.insert(&entry) {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                return Err(ApiError::BusinessRuleViolation(
                    "package is already in the wishlist".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::WishlistAdd,
            None,
            Some(json!({ "package_id": package_id })),
        );
        Ok(entry)
    }

    /// # 返回
    /// 线路原本在心愿单中时返回 true
    pub fn remove_from_wishlist(&self, user_id: &str, package_id: &str) -> ApiResult<bool> {
        let removed = self.wishlist_repo.delete(user_id, package_id)?;
        if removed {
            record_activity(
                &self.activity_repo,
                user_id,
                ActivityType::WishlistRemove,
                None,
                Some(json!({ "package_id": package_id })),
            );
        }
        Ok(removed)
    }

    pub fn is_in_wishlist(&self, user_id: &str, package_id: &str) -> ApiResult<bool> {
        Ok(self.wishlist_repo.exists(user_id, package_id)?)
    }

    /// # 返回
    /// 切换后的收藏状态
    pub fn toggle_wishlist(&self, user_id: &str, package_id: &str) -> ApiResult<bool> {
        if self.is_in_wishlist(user_id, package_id)? {
            self.remove_from_wishlist(user_id, package_id)?;
            Ok(false)
        } else {
            self.add_to_wishlist(user_id, package_id)?;
            Ok(true)
        }
    }
}
