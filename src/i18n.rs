// ==========================================
// 国际化
// ==========================================
// 使用 rust-i18n，语言: en（默认）与 zh-CN
// rust_i18n::i18n! 宏在 lib.rs 中调用
// ==========================================

use crate::domain::types::BookingStatus;

/// 当前语言代码
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译不带参数的键
///
/// ```no_run
/// use trek_booking::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译键并替换 `%{name}` 占位符
///
/// ```no_run
/// use trek_booking::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/calendar.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 预订状态在当前语言下的显示名称
pub fn booking_status_label(status: BookingStatus) -> String {
    t(&format!("booking.status.{}", status.as_str()))
}
