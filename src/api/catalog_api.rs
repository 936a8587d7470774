// ==========================================
// 徒步旅行预订系统 - 线路目录 API
// ==========================================
// 面向客户的线路列表、搜索、地点与评价
// 未上架线路在这里不可见
// ==========================================

use std::sync::Arc;

use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::domain::activity::ActivityType;
use crate::domain::package::TrekPackage;
use crate::domain::review::{is_valid_rating, NewReview, Review, ReviewUpdate, MAX_RATING, MIN_RATING};
use crate::domain::types::BookingStatus;
use crate::engine::{CatalogFilter, PackageFilter, PackageSearchResult};
use crate::repository::{ActivityRepository, BookingRepository, PackageRepository, ReviewRepository};

pub struct CatalogApi {
    package_repo: Arc<PackageRepository>,
    review_repo: Arc<ReviewRepository>,
    booking_repo: Arc<BookingRepository>,
    activity_repo: Arc<ActivityRepository>,
}

impl CatalogApi {
    pub fn new(
        package_repo: Arc<PackageRepository>,
        review_repo: Arc<ReviewRepository>,
        booking_repo: Arc<BookingRepository>,
        activity_repo: Arc<ActivityRepository>,
    ) -> Self {
        Self {
            package_repo,
            review_repo,
            booking_repo,
            activity_repo,
        }
    }

    /// 上架线路，评分高者在前
    pub fn get_trek_packages(&self) -> ApiResult<Vec<TrekPackage>> {
        Ok(self.package_repo.list_active()?)
    }

    /// 线路不存在或未上架时为 `None`
    pub fn get_trek_package_by_id(&self, id: &str) -> ApiResult<Option<TrekPackage>> {
        Ok(self.package_repo.find_by_id(id)?.filter(|p| p.is_active))
    }

    pub fn search_packages(&self, filter: &PackageFilter) -> ApiResult<PackageSearchResult> {
        let packages = self.package_repo.list_active()?;
        Ok(CatalogFilter::apply(packages, filter))
    }

    pub fn list_locations(&self) -> ApiResult<Vec<String>> {
        Ok(self.package_repo.list_active_locations()?)
    }

    pub fn get_package_reviews(&self, package_id: &str) -> ApiResult<Vec<Review>> {
        Ok(self.review_repo.list_by_package(package_id)?)
    }

    /// 评价已完成的行程
    ///
    /// # 错误
    /// - `InvalidInput`: 评分不在 1..=5
    /// - `NotFound`: 预订不存在或属于他人
    /// - `BusinessRuleViolation`: 预订未完成
    /// - `AlreadyExists`: 该预订已评价
    pub fn create_review(&self, user_id: &str, input: NewReview) -> ApiResult<Review> {
        if !is_valid_rating(input.rating) {
            return Err(rating_error(input.rating));
        }
        let booking = self
            .booking_repo
            .find_by_id(&input.booking_id)?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("Booking (id={})", input.booking_id)))?;
        if booking.status != BookingStatus::Completed {
            return Err(ApiError::BusinessRuleViolation(
                "only completed trips can be reviewed".to_string(),
            ));
        }

        let now = chrono::Local::now().naive_local();
        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            package_id: booking.package_id.clone(),
            booking_id: booking.id.clone(),
            rating: input.rating,
            comment: input.comment.trim().to_string(),
            reviewer_name: None,
            created_at: now,
            updated_at: now,
        };
        self.review_repo.insert(&review)?;

        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::ReviewSubmitted,
            None,
            Some(json!({ "package_id": review.package_id, "rating": review.rating })),
        );
        self.reload_review(&review.id)
    }

    /// 只有作者本人可以修改评价
    pub fn update_review(&self, user_id: &str, review_id: &str, update: ReviewUpdate) -> ApiResult<Review> {
        let mut review = self
            .review_repo
            .find_by_id(review_id)?
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("Review (id={})", review_id)))?;

        if let Some(rating) = update.rating {
            if !is_valid_rating(rating) {
                return Err(rating_error(rating));
            }
            review.rating = rating;
        }
        if let Some(comment) = update.comment {
            review.comment = comment.trim().to_string();
        }
        review.updated_at = chrono::Local::now().naive_local();
        self.review_repo.update(&review)?;
        self.reload_review(review_id)
    }

    fn reload_review(&self, id: &str) -> ApiResult<Review> {
        self.review_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::InternalError(format!("review {} vanished after write", id)))
    }
}

fn rating_error(rating: i32) -> ApiError {
    ApiError::InvalidInput(format!(
        "rating must be between {} and {}, got {}",
        MIN_RATING, MAX_RATING, rating
    ))
}
