// ==========================================
// 徒步旅行预订系统 - 核心库
// ==========================================
// 徒步线路目录、按日期的余位、预订、
// 客户账户与管理后台
// 技术栈: Tauri + Rust + SQLite
// ==========================================

rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与枚举
pub mod domain;

// 数据访问层 - SQLite
pub mod repository;

// 引擎层 - 纯业务规则
pub mod engine;

// 导入层 - 余位日历文件
pub mod importer;

// 配置层 - config_kv
pub mod config;

// 凭据与输入校验
pub mod auth;

// 通知渠道与预订确认消息
pub mod messaging;

// 连接配置与建表
pub mod db;

// SQL 耗时统计
pub mod perf;

pub mod logging;

pub mod i18n;

// API 层 - 业务操作
pub mod api;

// 应用层 - Tauri 集成
pub mod app;

// ==========================================
// 重新导出
// ==========================================

pub use domain::types::{BookingStatus, ChannelKind, DeliveryStatus, Difficulty, PaymentStatus};

pub use domain::{
    AvailabilitySlot, Booking, BookingWithDetails, MessageLog, MessageTemplate, TrekPackage,
    UserProfile, WishlistEntry,
};

pub use engine::{AvailabilityRules, CatalogFilter, PackageFilter, StatsEngine};

pub use api::{AdminApi, AuthApi, AvailabilityApi, BookingApi, CatalogApi, UserApi, WishlistApi};

// ==========================================
// 常量
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Trek Booking";
