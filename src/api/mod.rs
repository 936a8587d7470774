// ==========================================
// 徒步旅行预订系统 - API 层
// ==========================================
// 供 Tauri 命令调用的业务操作
// ==========================================

pub mod admin_api;
pub mod auth_api;
pub mod availability_api;
pub mod booking_api;
pub mod catalog_api;
pub mod error;
pub mod user_api;
pub mod wishlist_api;

pub use admin_api::{AdminApi, BookingQuery, BookingStatusUpdate, PackageStatusFilter};
pub use auth_api::AuthApi;
pub use availability_api::AvailabilityApi;
pub use booking_api::BookingApi;
pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult};
pub use user_api::UserApi;
pub use wishlist_api::WishlistApi;
