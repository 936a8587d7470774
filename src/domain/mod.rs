// ==========================================
// 徒步旅行预订系统 - 领域层
// ==========================================
// 实体与枚举。不做数据访问，业务规则仅限
// 实体自身可检查的不变量
// ==========================================

pub mod activity;
pub mod availability;
pub mod booking;
pub mod message;
pub mod package;
pub mod review;
pub mod stats;
pub mod types;
pub mod user;

pub use activity::{ActivityType, UserActivity};
pub use availability::{AvailabilitySlot, SlotCapacity, SlotUpdate};
pub use booking::{
    Booking, BookingPackage, BookingUser, BookingWithDetails, BookingWithPackage,
    NewBookingRequest,
};
pub use message::{MessageLog, MessageTemplate, OutgoingMessage};
pub use package::{ItineraryDay, PackageDraft, PackageSummary, TrekPackage};
pub use review::{NewReview, Review, ReviewUpdate, WishlistEntry};
pub use stats::{AdminStats, BookingStatRow};
pub use types::{BookingStatus, ChannelKind, DeliveryStatus, Difficulty, PaymentStatus};
pub use user::{
    ActivityStats, ProfileUpdate, Session, SignInData, SignUpData, UserBookingStats,
    UserDashboard, UserProfile, UserProfileWithStats,
};
