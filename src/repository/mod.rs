// ==========================================
// 徒步旅行预订系统 - 数据访问层
// ==========================================
// 只做数据访问，不含业务规则。所有查询均参数化
// 每个仓储都包装共享的 Arc<Mutex<Connection>>
// ==========================================

pub mod activity_repo;
pub mod availability_repo;
pub mod booking_repo;
pub mod error;
pub mod message_repo;
pub mod package_repo;
pub mod review_repo;
pub mod user_repo;
pub mod wishlist_repo;

pub use activity_repo::ActivityRepository;
pub use availability_repo::AvailabilityRepository;
pub use booking_repo::{BookingRepository, StatusChange};
pub use error::{RepositoryError, RepositoryResult};
pub use message_repo::MessageRepository;
pub use package_repo::PackageRepository;
pub use review_repo::ReviewRepository;
pub use user_repo::{CredentialEntity, SessionEntity, UserRepository};
pub use wishlist_repo::WishlistRepository;
