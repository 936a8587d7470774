use crate::app::state::AppState;
use crate::domain::review::{NewReview, ReviewUpdate};
use crate::engine::PackageFilter;

use super::common::{map_api_error, to_json};

// ==========================================
// 线路目录命令（线路、搜索、评价、日期）
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_trek_packages(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let packages = state.catalog_api.get_trek_packages().map_err(map_api_error)?;
    to_json(&packages)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_trek_package_by_id(state: tauri::State<'_, AppState>, id: String) -> Result<String, String> {
    let package = state
        .catalog_api
        .get_trek_package_by_id(&id)
        .map_err(map_api_error)?;
    to_json(&package)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn search_packages(
    state: tauri::State<'_, AppState>,
    filter: Option<PackageFilter>,
) -> Result<String, String> {
    let result = state
        .catalog_api
        .search_packages(&filter.unwrap_or_default())
        .map_err(map_api_error)?;
    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_locations(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let locations = state.catalog_api.list_locations().map_err(map_api_error)?;
    to_json(&locations)
}

/// 尚有名额的日期，升序
#[tauri::command(rename_all = "snake_case")]
pub async fn get_available_dates(state: tauri::State<'_, AppState>, package_id: String) -> Result<String, String> {
    let dates = state
        .availability_api
        .get_available_dates(&package_id)
        .map_err(map_api_error)?;
    to_json(&dates)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_package_reviews(state: tauri::State<'_, AppState>, package_id: String) -> Result<String, String> {
    let reviews = state
        .catalog_api
        .get_package_reviews(&package_id)
        .map_err(map_api_error)?;
    to_json(&reviews)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_review(
    state: tauri::State<'_, AppState>,
    token: String,
    review: NewReview,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let review = state
        .catalog_api
        .create_review(&user.id, review)
        .map_err(map_api_error)?;
    to_json(&review)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_review(
    state: tauri::State<'_, AppState>,
    token: String,
    review_id: String,
    update: ReviewUpdate,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let review = state
        .catalog_api
        .update_review(&user.id, &review_id, update)
        .map_err(map_api_error)?;
    to_json(&review)
}
