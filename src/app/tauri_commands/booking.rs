use crate::app::state::AppState;
use crate::domain::booking::NewBookingRequest;

use super::common::{emit_frontend_event, map_api_error, to_json};

// ==========================================
// 客户预订命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn create_booking(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    token: String,
    request: NewBookingRequest,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let booking = state
        .booking_api
        .create_booking(&user.id, request)
        .map_err(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "create_booking failed");
            map_api_error(e)
        })?;

    emit_frontend_event(
        &app,
        "availability_changed",
        serde_json::json!({ "package_id": booking.package_id, "date": booking.start_date }),
    );
    to_json(&booking)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_bookings(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let bookings = state
        .booking_api
        .get_user_bookings(&user.id)
        .map_err(map_api_error)?;
    to_json(&bookings)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_booking(
    state: tauri::State<'_, AppState>,
    token: String,
    booking_id: String,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let booking = state
        .booking_api
        .get_booking(&user.id, &booking_id)
        .map_err(map_api_error)?;
    to_json(&booking)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn cancel_booking(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    token: String,
    booking_id: String,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let booking = state
        .booking_api
        .cancel_booking(&user.id, &booking_id)
        .map_err(map_api_error)?;

    emit_frontend_event(
        &app,
        "availability_changed",
        serde_json::json!({ "package_id": booking.package_id, "date": booking.start_date }),
    );
    to_json(&booking)
}
