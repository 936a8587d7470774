// ==========================================
// 徒步旅行预订系统 - 用户仓储
// ==========================================
// 表: profiles、user_credentials、user_sessions、password_reset_tokens
// ==========================================

use crate::db::{format_date, format_datetime, parse_date_column, parse_datetime_column};
use crate::domain::user::UserProfile;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PROFILE_COLUMNS: &str = "id, email, name, phone, avatar_url, bio, date_of_birth, \
     emergency_contact, preferences_json, is_admin, created_at, updated_at";

/// 单个用户的密码哈希存储
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialEntity {
    pub password_hash: String, // base64 编码
    pub password_salt: String, // base64 编码
    pub iterations: u32,
}

#[derive(Debug, Clone)]
pub struct SessionEntity {
    pub token: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 用户资料 =====

    /// 在一个事务中创建用户资料及其凭据
    ///
    /// # 错误
    /// - `AlreadyExists`: 邮箱已被占用
    pub fn create_with_credentials(
        &self,
        profile: &UserProfile,
        credential: &CredentialEntity,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO profiles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                PROFILE_COLUMNS
            ),
            params![
                profile.id,
                profile.email,
                profile.name,
                profile.phone,
                profile.avatar_url,
                profile.bio,
                profile.date_of_birth.map(format_date),
                profile.emergency_contact,
                profile.preferences.as_ref().map(|p| p.to_string()),
                profile.is_admin,
                format_datetime(profile.created_at),
                format_datetime(profile.updated_at),
            ],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => RepositoryError::AlreadyExists {
                entity: "UserProfile".to_string(),
                key: profile.email.clone(),
            },
            other => other,
        })?;
        write_credential(&tx, &profile.id, credential, profile.created_at)?;
        tx.commit()?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<UserProfile>> {
        let conn = self.get_conn()?;
        let profile = conn
            .query_row(
                &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
                params![id],
                map_profile_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// 按邮箱查找，邮箱已由调用方规范化
    pub fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserProfile>> {
        let conn = self.get_conn()?;
        let profile = conn
            .query_row(
                &format!("SELECT {} FROM profiles WHERE email = ?1", PROFILE_COLUMNS),
                params![email],
                map_profile_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// 写回用户可编辑的资料字段
    pub fn update_profile(&self, profile: &UserProfile) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE profiles SET
                name = ?2, phone = ?3, avatar_url = ?4, bio = ?5, date_of_birth = ?6,
                emergency_contact = ?7, preferences_json = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
            params![
                profile.id,
                profile.name,
                profile.phone,
                profile.avatar_url,
                profile.bio,
                profile.date_of_birth.map(format_date),
                profile.emergency_contact,
                profile.preferences.as_ref().map(|p| p.to_string()),
                format_datetime(profile.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("UserProfile", profile.id.clone()));
        }
        Ok(())
    }

    pub fn set_admin(&self, id: &str, is_admin: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE profiles SET is_admin = ?2 WHERE id = ?1",
            params![id, is_admin],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("UserProfile", id));
        }
        Ok(())
    }

    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?)
    }

    // ===== 凭据 =====

    pub fn find_credential(&self, user_id: &str) -> RepositoryResult<Option<CredentialEntity>> {
        let conn = self.get_conn()?;
        let credential = conn
            .query_row(
                "SELECT password_hash, password_salt, iterations FROM user_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(CredentialEntity {
                        password_hash: row.get(0)?,
                        password_salt: row.get(1)?,
                        iterations: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(credential)
    }

    pub fn update_credential(
        &self,
        user_id: &str,
        credential: &CredentialEntity,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        write_credential(&conn, user_id, credential, now)
    }

    // ===== 会话 =====

    pub fn insert_session(&self, session: &SessionEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO user_sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.user_id,
                format_datetime(session.created_at),
                format_datetime(session.expires_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_session(&self, token: &str) -> RepositoryResult<Option<SessionEntity>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                "SELECT token, user_id, created_at, expires_at FROM user_sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(SessionEntity {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: parse_datetime_column(2, &row.get::<_, String>(2)?)?,
                        expires_at: parse_datetime_column(3, &row.get::<_, String>(3)?)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// # 返回
    /// 会话存在时返回 true
    pub fn delete_session(&self, token: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM user_sessions WHERE token = ?1", params![token])?;
        Ok(changed > 0)
    }

    /// 删除用户的全部会话，例如密码重置之后
    pub fn delete_sessions_for_user(&self, user_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM user_sessions WHERE user_id = ?1", params![user_id])?)
    }

    pub fn purge_expired_sessions(&self, now: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute(
            "DELETE FROM user_sessions WHERE expires_at <= ?1",
            params![format_datetime(now)],
        )?)
    }

    // ===== 密码重置 =====

    pub fn insert_reset_token(
        &self,
        token: &str,
        user_id: &str,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at, used) VALUES (?1, ?2, ?3, 0)",
            params![token, user_id, format_datetime(expires_at)],
        )?;
        Ok(())
    }

    /// 将未使用且未过期的重置令牌标记为已使用
    ///
    /// # 返回
    /// - Ok(Some(user_id)): 令牌有效
    /// - Ok(None): 令牌不存在、已过期或已使用
    pub fn consume_reset_token(&self, token: &str, now: NaiveDateTime) -> RepositoryResult<Option<String>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let user_id: Option<String> = tx
            .query_row(
                "SELECT user_id FROM password_reset_tokens
                 WHERE token = ?1 AND used = 0 AND expires_at > ?2",
                params![token, format_datetime(now)],
                |row| row.get(0),
            )
            .optional()?;
        if user_id.is_some() {
            tx.execute(
                "UPDATE password_reset_tokens SET used = 1 WHERE token = ?1",
                params![token],
            )?;
        }
        tx.commit()?;
        Ok(user_id)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_profile_row(row: &Row) -> rusqlite::Result<UserProfile> {
    let preferences = match row.get::<_, Option<String>>(8)? {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    let date_of_birth = match row.get::<_, Option<String>>(6)? {
        Some(raw) => Some(parse_date_column(6, &raw)?),
        None => None,
    };
    Ok(UserProfile {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        avatar_url: row.get(4)?,
        bio: row.get(5)?,
        date_of_birth,
        emergency_contact: row.get(7)?,
        preferences,
        is_admin: row.get(9)?,
        created_at: parse_datetime_column(10, &row.get::<_, String>(10)?)?,
        updated_at: parse_datetime_column(11, &row.get::<_, String>(11)?)?,
    })
}

fn write_credential(
    conn: &Connection,
    user_id: &str,
    credential: &CredentialEntity,
    now: NaiveDateTime,
) -> RepositoryResult<()> {
    conn.execute(
        "INSERT INTO user_credentials (user_id, password_hash, password_salt, iterations, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            password_hash = ?2, password_salt = ?3, iterations = ?4, updated_at = ?5",
        params![
            user_id,
            credential.password_hash,
            credential.password_salt,
            credential.iterations,
            format_datetime(now),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> UserRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        UserRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn profile(id: &str, email: &str) -> UserProfile {
        let now = chrono::Local::now().naive_local();
        UserProfile {
            id: id.to_string(),
            email: email.to_string(),
            name: "Ravi".to_string(),
            phone: None,
            avatar_url: None,
            bio: None,
            date_of_birth: None,
            emergency_contact: None,
            preferences: Some(serde_json::json!({"newsletter": true})),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn credential() -> CredentialEntity {
        CredentialEntity {
            password_hash: "aGFzaA==".to_string(),
            password_salt: "c2FsdA==".to_string(),
            iterations: 1000,
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = repo();
        repo.create_with_credentials(&profile("u1", "ravi@example.com"), &credential())
            .unwrap();
        let err = repo
            .create_with_credentials(&profile("u2", "ravi@example.com"), &credential())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
        assert!(repo.find_by_id("u2").unwrap().is_none());

        let found = repo.find_by_email("ravi@example.com").unwrap().unwrap();
        assert_eq!(found.preferences.unwrap()["newsletter"], true);
        assert_eq!(repo.find_credential("u1").unwrap(), Some(credential()));
    }

    #[test]
    fn test_reset_token_single_use_and_expiry() {
        let repo = repo();
        repo.create_with_credentials(&profile("u1", "ravi@example.com"), &credential())
            .unwrap();
        let now = chrono::Local::now().naive_local();

        repo.insert_reset_token("tok", "u1", now + Duration::hours(1))
            .unwrap();
        repo.insert_reset_token("old", "u1", now - Duration::minutes(1))
            .unwrap();

        assert_eq!(repo.consume_reset_token("tok", now).unwrap().as_deref(), Some("u1"));
        assert_eq!(repo.consume_reset_token("tok", now).unwrap(), None);
        assert_eq!(repo.consume_reset_token("old", now).unwrap(), None);
    }

    #[test]
    fn test_sessions() {
        let repo = repo();
        repo.create_with_credentials(&profile("u1", "ravi@example.com"), &credential())
            .unwrap();
        let now = chrono::Local::now().naive_local();
        for (token, hours) in [("live", 2), ("stale", -2)] {
            repo.insert_session(&SessionEntity {
                token: token.to_string(),
                user_id: "u1".to_string(),
                created_at: now,
                expires_at: now + Duration::hours(hours),
            })
            .unwrap();
        }

        assert_eq!(repo.purge_expired_sessions(now).unwrap(), 1);
        assert!(repo.find_session("live").unwrap().is_some());
        assert!(repo.delete_session("live").unwrap());
        assert!(!repo.delete_session("live").unwrap());
    }
}
