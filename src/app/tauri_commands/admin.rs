use crate::api::{BookingQuery, PackageStatusFilter};
use crate::app::state::AppState;
use crate::domain::availability::SlotUpdate;
use crate::domain::package::PackageDraft;
use crate::domain::types::BookingStatus;

use super::common::{emit_frontend_event, map_api_error, parse_date, to_json};

// ==========================================
// 管理后台命令：预订、仪表盘、线路、余位
// ==========================================

fn parse_status(raw: &str) -> Result<BookingStatus, String> {
    raw.parse::<BookingStatus>()
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_all_bookings_detailed(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let bookings = state
        .admin_api
        .get_all_bookings_detailed()
        .map_err(map_api_error)?;
    to_json(&bookings)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn search_bookings(
    state: tauri::State<'_, AppState>,
    token: String,
    query: BookingQuery,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let bookings = state.admin_api.search_bookings(&query).map_err(map_api_error)?;
    to_json(&bookings)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_booking_status(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    token: String,
    booking_id: String,
    status: String,
    payment_id: Option<String>,
    send_notification: Option<bool>,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let status = parse_status(&status)?;

    let result = state
        .admin_api
        .update_booking_status_with_notification(
            &admin.id,
            &booking_id,
            status,
            payment_id.as_deref(),
            send_notification.unwrap_or(true),
        )
        .await
        .map_err(map_api_error)?;

    if result.slot_released {
        emit_frontend_event(
            &app,
            "availability_changed",
            serde_json::json!({
                "package_id": result.booking.package_id,
                "date": result.booking.start_date,
            }),
        );
    }
    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_admin_stats(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let stats = state.admin_api.get_admin_stats().map_err(map_api_error)?;
    to_json(&stats)
}

// ===== 线路 =====

#[tauri::command(rename_all = "snake_case")]
pub async fn list_all_packages(
    state: tauri::State<'_, AppState>,
    token: String,
    search: Option<String>,
    status: Option<String>,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let status: PackageStatusFilter = status.as_deref().unwrap_or("all").parse()?;
    let packages = state
        .admin_api
        .list_all_packages(search.as_deref(), status)
        .map_err(map_api_error)?;
    to_json(&packages)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_trek_package(
    state: tauri::State<'_, AppState>,
    token: String,
    draft: PackageDraft,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let package = state
        .admin_api
        .create_trek_package(&admin.id, draft)
        .map_err(map_api_error)?;
    to_json(&package)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_trek_package(
    state: tauri::State<'_, AppState>,
    token: String,
    id: String,
    draft: PackageDraft,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let package = state
        .admin_api
        .update_trek_package(&admin.id, &id, draft)
        .map_err(map_api_error)?;
    to_json(&package)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_trek_package(state: tauri::State<'_, AppState>, token: String, id: String) -> Result<(), String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .admin_api
        .delete_trek_package(&admin.id, &id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn toggle_package_status(
    state: tauri::State<'_, AppState>,
    token: String,
    id: String,
    is_active: bool,
) -> Result<(), String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .admin_api
        .toggle_package_status(&admin.id, &id, is_active)
        .map_err(map_api_error)
}

// ===== 余位 =====

#[tauri::command(rename_all = "snake_case")]
pub async fn get_package_availability(
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let slots = state
        .availability_api
        .get_package_availability(&package_id)
        .map_err(map_api_error)?;
    to_json(&slots)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn add_package_availability(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
    available_date: String,
    max_bookings: Option<i32>,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let date = parse_date(&available_date)?;
    let slot = state
        .availability_api
        .add_package_availability(&admin.id, &package_id, date, max_bookings)
        .map_err(map_api_error)?;

    emit_frontend_event(
        &app,
        "availability_changed",
        serde_json::json!({ "package_id": package_id, "date": date }),
    );
    to_json(&slot)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_package_availability(
    state: tauri::State<'_, AppState>,
    token: String,
    slot_id: String,
    update: SlotUpdate,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let slot = state
        .availability_api
        .update_package_availability(&admin.id, &slot_id, update)
        .map_err(map_api_error)?;
    to_json(&slot)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn remove_package_availability(
    state: tauri::State<'_, AppState>,
    token: String,
    slot_id: String,
) -> Result<(), String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .availability_api
        .remove_package_availability(&admin.id, &slot_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn import_availability(
    state: tauri::State<'_, AppState>,
    token: String,
    file_path: String,
) -> Result<String, String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let report = state
        .availability_api
        .import_availability(&admin.id, &file_path)
        .map_err(|e| {
            tracing::error!(file_path = %file_path, error = %e, "availability import failed");
            map_api_error(e)
        })?;
    to_json(&report)
}
