// ==========================================
// 徒步旅行预订系统 - Tauri 命令（按领域拆分）
// ==========================================

#![cfg(feature = "tauri-app")]

mod admin;
mod auth;
mod booking;
mod catalog;
mod common;
mod config;
mod messaging;
mod user;
mod wishlist;

pub use admin::*;
pub use auth::*;
pub use booking::*;
pub use catalog::*;
pub use config::*;
pub use messaging::*;
pub use user::*;
pub use wishlist::*;
