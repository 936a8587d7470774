use crate::app::state::AppState;
use crate::domain::activity::ActivityType;
use crate::domain::user::ProfileUpdate;

use super::common::{map_api_error, to_json};

// ==========================================
// 资料与活动命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_profile(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let profile = state.user_api.get_user_profile(&user.id).map_err(map_api_error)?;
    to_json(&profile)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_user_profile(
    state: tauri::State<'_, AppState>,
    token: String,
    update: ProfileUpdate,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let profile = state
        .user_api
        .update_user_profile_with_logging(&user.id, update)
        .map_err(map_api_error)?;
    to_json(&profile)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_profile_with_stats(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let stats = state
        .user_api
        .get_user_profile_with_stats(&user.id)
        .map_err(map_api_error)?;
    to_json(&stats)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_activity_history(
    state: tauri::State<'_, AppState>,
    token: String,
    limit: Option<usize>,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let history = state
        .user_api
        .get_user_activity_history(&user.id, limit)
        .map_err(map_api_error)?;
    to_json(&history)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_dashboard_stats(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let dashboard = state
        .user_api
        .get_user_dashboard_stats(&user.id)
        .map_err(map_api_error)?;
    to_json(&dashboard)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn log_user_activity(
    state: tauri::State<'_, AppState>,
    token: String,
    activity_type: ActivityType,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let activity = state
        .user_api
        .log_user_activity(&user.id, activity_type, description, metadata)
        .map_err(map_api_error)?;
    to_json(&activity)
}
