// ==========================================
// 徒步旅行预订系统 - 仓储错误类型
// ==========================================
// 所有仓储共用的 thiserror 枚举
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库 =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("failed to acquire database lock: {0}")]
    LockError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint violated: {0}")]
    CheckConstraintViolation(String),

    // ===== 余位 =====
    /// 该线路在该日期没有尚有名额的开放余位
    #[error("no capacity left: package={package_id} date={date}")]
    SlotUnavailable { package_id: String, date: String },

    // ===== 业务规则 =====
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: String, key: String },

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("invalid status transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== 数据质量 =====
    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("invalid field value (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 通用 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK") {
                    RepositoryError::CheckConstraintViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::InternalError(format!("json encoding: {}", err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constraint_errors_are_classified() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER NOT NULL CHECK (v >= 0), k TEXT UNIQUE);
             INSERT INTO t (id, v, k) VALUES (1, 1, 'a');",
        )
        .unwrap();

        let dup = conn
            .execute("INSERT INTO t (id, v, k) VALUES (2, 1, 'a')", [])
            .unwrap_err();
        assert!(matches!(
            RepositoryError::from(dup),
            RepositoryError::UniqueConstraintViolation(_)
        ));

        let neg = conn
            .execute("INSERT INTO t (id, v, k) VALUES (3, -1, 'b')", [])
            .unwrap_err();
        assert!(matches!(
            RepositoryError::from(neg),
            RepositoryError::CheckConstraintViolation(_)
        ));
    }
}
