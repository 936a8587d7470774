// ==========================================
// 徒步旅行预订系统 - 应用层
// ==========================================
// Tauri 集成：共享状态与前端命令
// ==========================================

pub mod state;
pub mod tauri_commands;

pub use state::{get_default_db_path, AppState};

#[cfg(feature = "tauri-app")]
pub use tauri_commands::*;
