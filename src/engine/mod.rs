// ==========================================
// 徒步旅行预订系统 - 引擎层
// ==========================================
// 以纯函数实现业务规则。无 SQL、无 I/O；每个拒绝
// 都附带 API 层可直接展示的原因
// ==========================================

pub mod availability;
pub mod catalog;
pub mod pricing;
pub mod stats;
pub mod template;

pub use availability::{AvailabilityRules, BookingRejection, SlotRejection};
pub use catalog::{
    CatalogFilter, DurationBucket, PackageFilter, PackageSearchResult, PriceRange, SortBy,
};
pub use pricing::PricingRules;
pub use stats::StatsEngine;
pub use template::TemplateRenderer;
