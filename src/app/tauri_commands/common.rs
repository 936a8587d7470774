use crate::api::error::ApiError;
use crate::i18n::t_with_args;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tauri::Manager;

// ==========================================
// 共享辅助函数：错误映射、日期解析、事件
// ==========================================

/// 返回给前端的错误载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Tauri 命令以 JSON 字符串形式返回错误
pub(super) fn map_api_error(err: ApiError) -> String {
    let (message, details) = match &err {
        ApiError::DateUnavailable { package_id, date } => (
            t_with_args("booking.date_unavailable", &[("date", date)]),
            Some(serde_json::json!({ "package_id": package_id, "date": date })),
        ),
        ApiError::InvalidStateTransition { from, to } => (
            err.to_string(),
            Some(serde_json::json!({ "from": from, "to": to })),
        ),
        _ => (err.to_string(), None),
    };
    let error_response = ErrorResponse {
        code: err.code().to_string(),
        message,
        details,
    };

    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {}", e))
}

pub(super) fn parse_date(date_str: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date_str, crate::db::DATE_FORMAT)
        .map_err(|e| format!("invalid date (expected YYYY-MM-DD): {}", e))
}

/// 向前端发送事件；发送失败不影响命令结果
pub(super) fn emit_frontend_event(app: &tauri::AppHandle, event: &str, payload: serde_json::Value) {
    if let Err(e) = app.emit_all(event, payload) {
        tracing::warn!(event, error = %e, "emit_all failed");
    }
}
