use crate::app::state::AppState;

use super::common::{map_api_error, to_json};

// ==========================================
// 心愿单命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_user_wishlist(state: tauri::State<'_, AppState>, token: String) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let entries = state
        .wishlist_api
        .get_user_wishlist(&user.id)
        .map_err(map_api_error)?;
    to_json(&entries)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn add_to_wishlist(
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
) -> Result<String, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    let entry = state
        .wishlist_api
        .add_to_wishlist(&user.id, &package_id)
        .map_err(map_api_error)?;
    to_json(&entry)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn remove_from_wishlist(
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
) -> Result<bool, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state
        .wishlist_api
        .remove_from_wishlist(&user.id, &package_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn is_in_wishlist(
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
) -> Result<bool, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state
        .wishlist_api
        .is_in_wishlist(&user.id, &package_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn toggle_wishlist(
    state: tauri::State<'_, AppState>,
    token: String,
    package_id: String,
) -> Result<bool, String> {
    let user = state.auth_api.require_user(&token).map_err(map_api_error)?;
    state
        .wishlist_api
        .toggle_wishlist(&user.id, &package_id)
        .map_err(map_api_error)
}
