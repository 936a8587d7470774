use crate::app::state::AppState;
use crate::domain::user::{SignInData, SignUpData};

use super::common::{map_api_error, to_json};

// ==========================================
// 认证命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn sign_up(state: tauri::State<'_, AppState>, data: SignUpData) -> Result<String, String> {
    let profile = state.auth_api.sign_up(data).map_err(map_api_error)?;
    to_json(&profile)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn sign_in(state: tauri::State<'_, AppState>, data: SignInData) -> Result<String, String> {
    let session = state.auth_api.sign_in(data).map_err(map_api_error)?;
    to_json(&session)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn sign_out(state: tauri::State<'_, AppState>, token: String) -> Result<(), String> {
    state.auth_api.sign_out(&token).map_err(map_api_error)
}

/// 会话未知或已过期时返回 `null`
#[tauri::command(rename_all = "snake_case")]
pub async fn get_current_user(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.current_user(&token).map_err(map_api_error)?;
    to_json(&user)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn check_is_admin(state: tauri::State<'_, AppState>, token: String) -> Result<bool, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state.auth_api.check_is_admin(&user.id).map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn request_password_reset(state: tauri::State<'_, AppState>, email: String) -> Result<(), String> {
    state.auth_api.request_password_reset(&email).map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn reset_password(
    state: tauri::State<'_, AppState>,
    reset_token: String,
    new_password: String,
) -> Result<(), String> {
    state
        .auth_api
        .reset_password(&reset_token, &new_password)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_password(
    state: tauri::State<'_, AppState>,
    token: String,
    current_password: String,
    new_password: String,
) -> Result<(), String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state
        .auth_api
        .update_password(&user.id, &current_password, &new_password)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn track_user_session(
    state: tauri::State<'_, AppState>,
    token: String,
    page: Option<String>,
) -> Result<(), String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state
        .auth_api
        .track_user_session(&user.id, page.as_deref())
        .map_err(map_api_error)
}
