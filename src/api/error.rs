// ==========================================
// 徒步旅行预订系统 - API 错误类型
// ==========================================
// 将仓储与引擎的失败转换为前端可展示的信息
// 每个变体都携带明确原因
// ==========================================

use crate::auth::CredentialIssue;
use crate::engine::{BookingRejection, SlotRejection};
use crate::i18n::t_with_args;
use crate::importer::ImportError;
use crate::messaging::MessagingError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入 / 业务规则 =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("invalid status transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    /// 所选日期没有开放名额（已关闭、已满或从未开放）
    #[error("date unavailable: package={package_id} date={date}")]
    DateUnavailable { package_id: String, date: String },

    // ===== 认证 =====
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    // ===== 数据访问 =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    // ===== 导入 / 消息 =====
    #[error("import failed: {0}")]
    ImportError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("notification failed: {0}")]
    MessagingError(String),

    // ===== 通用 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 供前端使用的稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyExists(_) => "ALREADY_EXISTS",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::DateUnavailable { .. } => "DATE_UNAVAILABLE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::MessagingError(_) => "MESSAGING_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 包装配置读取失败（ConfigManager 返回的 `Box<dyn Error>`）
    pub fn config(err: Box<dyn std::error::Error>) -> Self {
        ApiError::InternalError(format!("config: {}", err))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock poisoned: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::AlreadyExists(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("referenced record missing: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => ApiError::BusinessRuleViolation(msg),

            RepositoryError::SlotUnavailable { package_id, date } => {
                ApiError::DateUnavailable { package_id, date }
            }
            RepositoryError::AlreadyExists { entity, key } => {
                ApiError::AlreadyExists(format!("{} {}", entity, key))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }

            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{}: {}", field, message))
            }

            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<BookingRejection> for ApiError {
    fn from(err: BookingRejection) -> Self {
        match err {
            BookingRejection::PackageInactive(id) => {
                ApiError::NotFound(format!("TrekPackage (id={})", id))
            }
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl From<SlotRejection> for ApiError {
    fn from(err: SlotRejection) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<CredentialIssue> for ApiError {
    fn from(issue: CredentialIssue) -> Self {
        ApiError::InvalidInput(issue.message())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => {
                ApiError::ImportError(t_with_args("import.file_not_found", &[("path", &path)]))
            }
            ImportError::UnsupportedFormat(ext) => {
                ApiError::ImportError(t_with_args("import.unsupported_format", &[("ext", &ext)]))
            }
            ImportError::Repository(e) => e.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::BookingNotFound(id) => ApiError::NotFound(format!("Booking (id={})", id)),
            MessagingError::LogNotFound(id) => ApiError::NotFound(format!("MessageLog (id={})", id)),
            MessagingError::AlreadyDelivered(id) => {
                ApiError::BusinessRuleViolation(format!("message {} was already delivered", id))
            }
            MessagingError::Config(msg) => ApiError::InternalError(format!("config: {}", msg)),
            MessagingError::Repository(e) => e.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Booking".to_string(),
            id: "B001".to_string(),
        }
        .into();
        match &api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Booking"));
                assert!(msg.contains("B001"));
            }
            _ => panic!("Expected NotFound"),
        }
        assert_eq!(api_err.code(), "NOT_FOUND");

        let api_err: ApiError = RepositoryError::SlotUnavailable {
            package_id: "p1".to_string(),
            date: "2030-01-01".to_string(),
        }
        .into();
        assert_eq!(api_err.code(), "DATE_UNAVAILABLE");
    }

    #[test]
    fn test_rejection_conversion() {
        let api_err: ApiError = BookingRejection::PackageInactive("p9".to_string()).into();
        assert!(matches!(api_err, ApiError::NotFound(_)));

        let api_err: ApiError = BookingRejection::GroupSizeOutOfRange {
            requested: 9,
            max: 4,
        }
        .into();
        assert_eq!(api_err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_messaging_error_conversion() {
        let api_err: ApiError = MessagingError::AlreadyDelivered("log-1".to_string()).into();
        assert_eq!(api_err.code(), "BUSINESS_RULE_VIOLATION");

        let api_err: ApiError = MessagingError::LogNotFound("log-2".to_string()).into();
        assert_eq!(api_err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError = ImportError::MissingColumn("package_id".to_string()).into();
        assert_eq!(api_err.code(), "IMPORT_ERROR");
        assert!(api_err.to_string().contains("package_id"));
    }
}
