// ==========================================
// 徒步旅行预订系统 - 配置
// ==========================================
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, MAX_SESSION_TTL_HOURS};
