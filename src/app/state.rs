// ==========================================
// 徒步旅行预订系统 - 应用状态
// ==========================================
// 共享的仓储与 API 实例。所有仓储共用一个 SQLite 连接；
// 写操作在其互斥锁与 SQLite 自身的写锁上
// 串行执行
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{
    AdminApi, AuthApi, AvailabilityApi, BookingApi, CatalogApi, UserApi, WishlistApi,
};
use crate::config::ConfigManager;
use crate::messaging::{
    MessageChannel, MessagingService, SimulatedEmailChannel, SimulatedWhatsAppChannel,
};
use crate::repository::{
    ActivityRepository, AvailabilityRepository, BookingRepository, MessageRepository,
    PackageRepository, ReviewRepository, UserRepository, WishlistRepository,
};

/// 由 Tauri 作为托管状态持有
pub struct AppState {
    pub db_path: String,

    pub auth_api: Arc<AuthApi>,
    pub user_api: Arc<UserApi>,
    pub catalog_api: Arc<CatalogApi>,
    pub availability_api: Arc<AvailabilityApi>,
    pub booking_api: Arc<BookingApi>,
    pub wishlist_api: Arc<WishlistApi>,
    pub admin_api: Arc<AdminApi>,

    /// 模板、消息日志、重发
    pub messaging: Arc<MessagingService>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 打开数据库，按需建表，并以模拟通知渠道
    /// 装配全部 API
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_channels(
            db_path,
            Arc::new(SimulatedWhatsAppChannel::default()),
            Arc::new(SimulatedEmailChannel::default()),
        )
    }

    pub fn with_channels(
        db_path: String,
        whatsapp: Arc<dyn MessageChannel>,
        email: Arc<dyn MessageChannel>,
    ) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("cannot create schema: {}", e))?;
        crate::db::check_schema_version(&conn)
            .map_err(|e| format!("schema version check failed: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ===== 仓储 =====
        let package_repo = Arc::new(PackageRepository::from_connection(conn.clone()));
        let availability_repo = Arc::new(AvailabilityRepository::from_connection(conn.clone()));
        let booking_repo = Arc::new(BookingRepository::from_connection(conn.clone()));
        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));
        let wishlist_repo = Arc::new(WishlistRepository::from_connection(conn.clone()));
        let review_repo = Arc::new(ReviewRepository::from_connection(conn.clone()));
        let message_repo = Arc::new(MessageRepository::from_connection(conn.clone()));
        let activity_repo = Arc::new(ActivityRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );

        // ===== 服务 =====
        let messaging = Arc::new(MessagingService::with_channels(
            message_repo,
            booking_repo.clone(),
            config_manager.clone(),
            whatsapp,
            email,
        ));

        // ===== API =====
        let auth_api = Arc::new(AuthApi::new(
            user_repo.clone(),
            activity_repo.clone(),
            config_manager.clone(),
        ));
        let user_api = Arc::new(UserApi::new(
            user_repo.clone(),
            booking_repo.clone(),
            activity_repo.clone(),
            config_manager.clone(),
        ));
        let catalog_api = Arc::new(CatalogApi::new(
            package_repo.clone(),
            review_repo,
            booking_repo.clone(),
            activity_repo.clone(),
        ));
        let availability_api = Arc::new(AvailabilityApi::new(
            package_repo.clone(),
            availability_repo,
            activity_repo.clone(),
            config_manager.clone(),
        ));
        let booking_api = Arc::new(BookingApi::new(
            package_repo.clone(),
            booking_repo.clone(),
            activity_repo.clone(),
        ));
        let wishlist_api = Arc::new(WishlistApi::new(
            wishlist_repo,
            package_repo.clone(),
            activity_repo.clone(),
        ));
        let admin_api = Arc::new(AdminApi::new(
            booking_repo,
            package_repo,
            user_repo,
            activity_repo,
            messaging.clone(),
        ));

        tracing::info!("AppState ready");
        Ok(Self {
            db_path,
            auth_api,
            user_api,
            catalog_api,
            availability_api,
            booking_api,
            wishlist_api,
            admin_api,
            messaging,
            config_manager,
        })
    }
}

/// 数据库位置
///
/// 优先使用 `TREK_BOOKING_DB_PATH`；否则为 `<data dir>/trek-booking/trek_booking.db`
/// （Debug 构建为 `trek-booking-dev`），再退回到当前工作目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("TREK_BOOKING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let Some(data_dir) = dirs::data_dir() else {
        return "./trek_booking.db".to_string();
    };

    #[cfg(debug_assertions)]
    let dir = data_dir.join("trek-booking-dev");
    #[cfg(not(debug_assertions))]
    let dir = data_dir.join("trek-booking");

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "cannot create data dir, using working directory");
        return "./trek_booking.db".to_string();
    }
    dir.join("trek_booking.db").to_string_lossy().to_string()
}
