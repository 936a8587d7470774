// ==========================================
// 徒步旅行预订系统 - 认证 API
// ==========================================
// 注册 / 登录 / 退出、会话查询、管理员检查、
// 密码重置与修改
// ==========================================

use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::user_api::record_activity;
use crate::auth::validation::{normalize_email, validate_password, validate_sign_in, validate_sign_up};
use crate::auth::{generate_token, hash_password, token_hint, verify_password};
use crate::config::ConfigManager;
use crate::domain::activity::ActivityType;
use crate::domain::user::{Session, SignInData, SignUpData, UserProfile};
use crate::i18n::t;
use crate::repository::{ActivityRepository, RepositoryError, SessionEntity, UserRepository};

/// 密码重置令牌的有效期
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

pub struct AuthApi {
    user_repo: Arc<UserRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl AuthApi {
    pub fn new(
        user_repo: Arc<UserRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            user_repo,
            activity_repo,
            config,
        }
    }

    /// 注册新客户账户
    ///
    /// # 错误
    /// - `InvalidInput`: 缺少字段、密码过短、邮箱/手机号格式错误
    /// - `AlreadyExists`: 邮箱已被占用
    pub fn sign_up(&self, data: SignUpData) -> ApiResult<UserProfile> {
        let min_len = self.config.min_password_len().map_err(ApiError::config)?;
        validate_sign_up(&data, min_len)?;

        let now = chrono::Local::now().naive_local();
        let profile = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(&data.email),
            name: data.name.trim().to_string(),
            phone: data
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            avatar_url: None,
            bio: None,
            date_of_birth: None,
            emergency_contact: None,
            preferences: None,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        let iterations = self.config.pbkdf2_iterations().map_err(ApiError::config)?;
        let credential = hash_password(&data.password, iterations);

        match self.user_repo.create_with_credentials(&profile, &credential) {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                return Err(ApiError::AlreadyExists(t("auth.email_taken")));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %profile.id, "user signed up");
        record_activity(
            &self.activity_repo,
            &profile.id,
            ActivityType::SignUp,
            Some("Account created".to_string()),
            None,
        );
        Ok(profile)
    }

    /// # 错误
    /// - `Unauthorized`: 邮箱不存在或密码错误（两者提示相同）
    pub fn sign_in(&self, data: SignInData) -> ApiResult<Session> {
        validate_sign_in(&data)?;
        let email = normalize_email(&data.email);

        let user = self
            .user_repo
            .find_by_email(&email)?
            .ok_or_else(|| ApiError::Unauthorized(t("auth.invalid_credentials")))?;
        let credential = self
            .user_repo
            .find_credential(&user.id)?
            .ok_or_else(|| ApiError::Unauthorized(t("auth.invalid_credentials")))?;
        if !verify_password(&data.password, &credential) {
            warn!(user_id = %user.id, "sign in rejected");
            return Err(ApiError::Unauthorized(t("auth.invalid_credentials")));
        }

        let now = chrono::Local::now().naive_local();
        let ttl = self.config.session_ttl_hours().map_err(ApiError::config)?;
        let purged = self.user_repo.purge_expired_sessions(now)?;
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }

        let entity = SessionEntity {
            token: generate_token(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + Duration::hours(ttl),
        };
        self.user_repo.insert_session(&entity)?;

        record_activity(&self.activity_repo, &user.id, ActivityType::SignIn, None, None);
        info!(user_id = %user.id, "user signed in");
        Ok(Session {
            token: entity.token,
            user,
            expires_at: entity.expires_at,
        })
    }

    /// 未知令牌直接忽略
    pub fn sign_out(&self, token: &str) -> ApiResult<()> {
        if let Some(session) = self.user_repo.find_session(token)? {
            self.user_repo.delete_session(token)?;
            record_activity(&self.activity_repo, &session.user_id, ActivityType::SignOut, None, None);
        }
        Ok(())
    }

    /// 会话令牌对应的用户；令牌未知或已过期时为 `None`
    pub fn current_user(&self, token: &str) -> ApiResult<Option<UserProfile>> {
        let Some(session) = self.user_repo.find_session(token)? else {
            return Ok(None);
        };
        let now = chrono::Local::now().naive_local();
        if session.expires_at <= now {
            self.user_repo.delete_session(token)?;
            return Ok(None);
        }
        Ok(self.user_repo.find_by_id(&session.user_id)?)
    }

    pub fn require_user(&self, token: &str) -> ApiResult<UserProfile> {
        self.current_user(token)?
            .ok_or_else(|| ApiError::Unauthorized(t("auth.session_expired")))
    }

    pub fn require_admin(&self, token: &str) -> ApiResult<UserProfile> {
        let user = self.require_user(token)?;
        if !user.is_admin {
            return Err(ApiError::Forbidden(t("auth.admin_required")));
        }
        Ok(user)
    }

    /// 未知用户不是管理员
    pub fn check_is_admin(&self, user_id: &str) -> ApiResult<bool> {
        Ok(self
            .user_repo
            .find_by_id(user_id)?
            .map(|u| u.is_admin)
            .unwrap_or(false))
    }

    /// 为 `email` 生成重置令牌
    ///
    /// # 返回
    /// - Ok(Some(token)): 邮箱已注册
    /// - Ok(None): 其他情况
    pub fn issue_reset_token(&self, email: &str) -> ApiResult<Option<String>> {
        let email = normalize_email(email);
        let Some(user) = self.user_repo.find_by_email(&email)? else {
            return Ok(None);
        };
        let token = generate_token();
        let expires_at = chrono::Local::now().naive_local() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.user_repo.insert_reset_token(&token, &user.id, expires_at)?;
        Ok(Some(token))
    }

    /// 发送重置链接。邮箱未注册时同样返回成功
    pub fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        if let Some(token) = self.issue_reset_token(email)? {
            // 未接入邮件服务：日志中只记录令牌前缀
            info!(
                target: "messaging",
                email = %normalize_email(email),
                token_hint = %token_hint(&token),
                "password reset link issued (simulated)"
            );
        }
        Ok(())
    }

    /// 凭重置令牌设置新密码。该用户的全部会话都会失效
    pub fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<()> {
        let min_len = self.config.min_password_len().map_err(ApiError::config)?;
        validate_password(new_password, min_len)?;

        let now = chrono::Local::now().naive_local();
        let user_id = self
            .user_repo
            .consume_reset_token(token, now)?
            .ok_or_else(|| ApiError::Unauthorized(t("auth.session_expired")))?;

        self.store_password(&user_id, new_password)?;
        self.user_repo.delete_sessions_for_user(&user_id)?;
        record_activity(
            &self.activity_repo,
            &user_id,
            ActivityType::PasswordChange,
            Some("Password reset".to_string()),
            None,
        );
        Ok(())
    }

    pub fn update_password(&self, user_id: &str, current: &str, new_password: &str) -> ApiResult<()> {
        let credential = self
            .user_repo
            .find_credential(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("UserProfile (id={})", user_id)))?;
        if !verify_password(current, &credential) {
            return Err(ApiError::Unauthorized(t("auth.invalid_credentials")));
        }
        let min_len = self.config.min_password_len().map_err(ApiError::config)?;
        validate_password(new_password, min_len)?;

        self.store_password(user_id, new_password)?;
        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::PasswordChange,
            Some("Password updated".to_string()),
            None,
        );
        Ok(())
    }

    /// 记录用户在应用中处于活跃状态（页面访问、心跳）
    pub fn track_user_session(&self, user_id: &str, page: Option<&str>) -> ApiResult<()> {
        record_activity(
            &self.activity_repo,
            user_id,
            ActivityType::SessionActivity,
            Some("User session activity".to_string()),
            page.map(|p| json!({ "page": p })),
        );
        Ok(())
    }

    fn store_password(&self, user_id: &str, password: &str) -> ApiResult<()> {
        let iterations = self.config.pbkdf2_iterations().map_err(ApiError::config)?;
        let credential = hash_password(password, iterations);
        self.user_repo
            .update_credential(user_id, &credential, chrono::Local::now().naive_local())?;
        Ok(())
    }
}
