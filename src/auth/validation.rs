// ==========================================
// 徒步旅行预订系统 - 凭据与资料校验
// ==========================================

use crate::domain::user::{SignInData, SignUpData};
use crate::i18n::{t, t_with_args};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

pub const MIN_NAME_LEN: usize = 2;

/// 按表单顺序返回第一条未通过的规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialIssue {
    MissingSignUpFields,
    MissingSignInFields,
    PasswordTooShort { min: usize },
    InvalidEmail,
    NameTooShort,
    InvalidPhone,
}

impl CredentialIssue {
    /// 当前语言下的提示文案
    pub fn message(&self) -> String {
        match self {
            CredentialIssue::MissingSignUpFields => t("auth.required_fields"),
            CredentialIssue::MissingSignInFields => t("auth.credentials_required"),
            CredentialIssue::PasswordTooShort { min } => {
                t_with_args("auth.password_too_short", &[("min", &min.to_string())])
            }
            CredentialIssue::InvalidEmail => t("auth.invalid_email"),
            CredentialIssue::NameTooShort => t("auth.name_too_short"),
            CredentialIssue::InvalidPhone => t("auth.invalid_phone"),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            CredentialIssue::MissingSignUpFields | CredentialIssue::MissingSignInFields => "form",
            CredentialIssue::PasswordTooShort { .. } => "password",
            CredentialIssue::InvalidEmail => "email",
            CredentialIssue::NameTooShort => "name",
            CredentialIssue::InvalidPhone => "phone",
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), CredentialIssue> {
    if password.chars().count() < min_len {
        return Err(CredentialIssue::PasswordTooShort { min: min_len });
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), CredentialIssue> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(CredentialIssue::NameTooShort);
    }
    Ok(())
}

/// 手机号为空表示"未填写"，校验通过
pub fn validate_optional_phone(phone: Option<&str>) -> Result<(), CredentialIssue> {
    match phone.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if !is_valid_phone(p) => Err(CredentialIssue::InvalidPhone),
        _ => Ok(()),
    }
}

pub fn validate_sign_up(data: &SignUpData, min_password_len: usize) -> Result<(), CredentialIssue> {
    if data.email.trim().is_empty() || data.password.is_empty() || data.name.trim().is_empty() {
        return Err(CredentialIssue::MissingSignUpFields);
    }
    validate_password(&data.password, min_password_len)?;
    if !is_valid_email(&normalize_email(&data.email)) {
        return Err(CredentialIssue::InvalidEmail);
    }
    validate_name(&data.name)?;
    validate_optional_phone(data.phone.as_deref())
}

pub fn validate_sign_in(data: &SignInData) -> Result<(), CredentialIssue> {
    if data.email.trim().is_empty() || data.password.is_empty() {
        return Err(CredentialIssue::MissingSignInFields);
    }
    if !is_valid_email(&normalize_email(&data.email)) {
        return Err(CredentialIssue::InvalidEmail);
    }
    Ok(())
}
