use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::domain::types::ChannelKind;

use super::common::{map_api_error, to_json};

// ==========================================
// 消息命令（管理员）
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_message_templates(
    state: tauri::State<'_, AppState>,
    token: String,
    channel: Option<String>,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let channel = channel
        .as_deref()
        .map(str::parse::<ChannelKind>)
        .transpose()?;
    let templates = state
        .messaging
        .get_message_templates(channel)
        .map_err(|e| map_api_error(ApiError::from(e)))?;
    to_json(&templates)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn send_booking_confirmation(
    state: tauri::State<'_, AppState>,
    token: String,
    booking_id: String,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let outcome = state
        .messaging
        .send_booking_confirmation(&booking_id)
        .await
        .map_err(|e| map_api_error(ApiError::from(e)))?;
    to_json(&outcome)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_booking_message_logs(
    state: tauri::State<'_, AppState>,
    token: String,
    booking_id: String,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let logs = state
        .messaging
        .get_booking_message_logs(&booking_id)
        .map_err(|e| map_api_error(ApiError::from(e)))?;
    to_json(&logs)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn retry_failed_message(
    state: tauri::State<'_, AppState>,
    token: String,
    log_id: String,
) -> Result<bool, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .messaging
        .retry_failed_message(&log_id)
        .await
        .map_err(|e| map_api_error(ApiError::from(e)))
}
