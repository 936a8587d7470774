use crate::api::error::ApiError;
use crate::app::state::AppState;

use super::common::{map_api_error, to_json};

// ==========================================
// 配置命令（仅管理员）
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_config_value(
    state: tauri::State<'_, AppState>,
    token: String,
    key: String,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let value = state
        .config_manager
        .get_global_config_value(&key)
        .map_err(|e| map_api_error(ApiError::config(e)))?;
    to_json(&value)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn set_config_value(
    state: tauri::State<'_, AppState>,
    token: String,
    key: String,
    value: String,
) -> Result<(), String> {
    let admin = state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .config_manager
        .set_global_config_value(&key, &value)
        .map_err(|e| map_api_error(ApiError::config(e)))?;
    tracing::info!(admin_id = %admin.id, key = %key, "config changed from admin panel");
    Ok(())
}

/// 全部 global 配置值，合并为一个 JSON 对象
#[tauri::command(rename_all = "snake_case")]
pub async fn get_config_snapshot(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| map_api_error(ApiError::config(e)))
}

#[tauri::command(rename_all = "snake_case")]
pub async fn restore_config_from_snapshot(
    state: tauri::State<'_, AppState>,
    token: String,
    snapshot_json: String,
) -> Result<String, String> {
    state.auth_api.require_admin(&token).map_err(map_api_error)?;
    let count = state
        .config_manager
        .restore_config_from_snapshot(&snapshot_json)
        .map_err(|e| map_api_error(ApiError::config(e)))?;
    to_json(&serde_json::json!({ "restored_count": count }))
}
