// ==========================================
// API 集成测试环境
// ==========================================
// 每个测试使用独立的 SQLite 文件，
// 与桌面端一样通过 AppState 装配
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use tempfile::TempDir;

use trek_booking::api::ApiError;
use trek_booking::app::AppState;
use trek_booking::config::config_keys;
use trek_booking::db::open_sqlite_connection;
use trek_booking::domain::{
    AvailabilitySlot, MessageTemplate, NewBookingRequest, PackageDraft, SignUpData, TrekPackage,
    UserProfile,
};
use trek_booking::messaging::{MessageChannel, SimulatedEmailChannel, SimulatedWhatsAppChannel};
use trek_booking::repository::{MessageRepository, UserRepository};
use trek_booking::ChannelKind;

pub const TEST_PASSWORD: &str = "secret123";

pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // 保持数据库文件存活
    _temp_dir: TempDir,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        Self::with_channels(
            Arc::new(SimulatedWhatsAppChannel::default()),
            Arc::new(SimulatedEmailChannel::default()),
        )
    }

    pub fn with_channels(
        whatsapp: Arc<dyn MessageChannel>,
        email: Arc<dyn MessageChannel>,
    ) -> Result<Self, String> {
        let temp_dir = tempfile::tempdir().map_err(|e| format!("cannot create temp dir: {}", e))?;
        let db_path = temp_dir
            .path()
            .join("trek_booking_test.db")
            .to_string_lossy()
            .to_string();

        let state = AppState::with_channels(db_path.clone(), whatsapp, email)?;
        state
            .config_manager
            .set_global_config_value(config_keys::AUTH_PBKDF2_ITERATIONS, "1000")
            .map_err(|e| e.to_string())?;

        Ok(Self {
            db_path,
            state,
            _temp_dir: temp_dir,
        })
    }

    /// 同一文件上的第二个 AppState，使用独立连接
    pub fn open_state(&self) -> Result<AppState, String> {
        AppState::new(self.db_path.clone())
    }

    // ==========================================
    // 数据准备
    // ==========================================

    pub fn sign_up_user(&self, name: &str, email: &str, phone: Option<&str>) -> UserProfile {
        self.state
            .auth_api
            .sign_up(SignUpData {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                name: name.to_string(),
                phone: phone.map(str::to_string),
            })
            .expect("sign up failed")
    }

    pub fn create_customer(&self) -> UserProfile {
        self.sign_up_user("Ananya Rao", "ananya@example.in", Some("9876543210"))
    }

    pub fn create_admin(&self) -> UserProfile {
        let admin = self.sign_up_user("Trek Admin", "admin@example.in", None);
        UserRepository::new(&self.db_path)
            .expect("open user repository")
            .set_admin(&admin.id, true)
            .expect("promote admin");
        UserProfile {
            is_admin: true,
            ..admin
        }
    }

    pub fn create_package(&self, admin_id: &str, draft: PackageDraft) -> TrekPackage {
        self.state
            .admin_api
            .create_trek_package(admin_id, draft)
            .expect("create package failed")
    }

    pub fn add_slot(&self, admin_id: &str, package_id: &str, days_ahead: i64, max_bookings: i32) -> AvailabilitySlot {
        self.state
            .availability_api
            .add_package_availability(admin_id, package_id, days_from_today(days_ahead), Some(max_bookings))
            .expect("add availability failed")
    }

    /// 两个渠道的启用中 "Booking Confirmation" 模板
    pub fn insert_confirmation_templates(&self) {
        let conn = open_sqlite_connection(&self.db_path).expect("open connection");
        let repo = MessageRepository::from_connection(Arc::new(Mutex::new(conn)));
        let now = chrono::Local::now().naive_local();

        let templates = [
            (
                ChannelKind::Whatsapp,
                None,
                "Hi {{userName}}, {{packageTitle}} on {{startDate}} is confirmed. Ref {{bookingReference}}",
            ),
            (
                ChannelKind::Email,
                Some("Booking Confirmed - {{packageTitle}}"),
                "Dear {{userName}}, total {{totalAmount}} for {{groupSize}} trekkers.",
            ),
        ];
        for (channel, subject, content) in templates {
            repo.insert_template(&MessageTemplate {
                id: uuid::Uuid::new_v4().to_string(),
                channel,
                name: "Booking Confirmation".to_string(),
                subject: subject.map(str::to_string),
                content: content.to_string(),
                variables: vec![],
                is_active: true,
                created_at: now,
            })
            .expect("insert template");
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn booking_request(package_id: &str, days_ahead: i64, group_size: i32) -> NewBookingRequest {
    NewBookingRequest {
        package_id: package_id.to_string(),
        start_date: days_from_today(days_ahead),
        group_size,
        special_requests: None,
    }
}

// ==========================================
// 断言
// ==========================================

pub fn assert_invalid_input<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

pub fn assert_business_rule<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::BusinessRuleViolation(_)) => {}
        other => panic!("expected BusinessRuleViolation, got {:?}", other),
    }
}

pub fn assert_date_unavailable<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::DateUnavailable { .. }) => {}
        other => panic!("expected DateUnavailable, got {:?}", other),
    }
}
