// ==========================================
// 徒步旅行预订系统 - 认证基础组件
// ==========================================

pub mod password;
pub mod validation;

pub use password::{
    generate_token, hash_password, token_hint, verify_password, DEFAULT_PBKDF2_ITERATIONS,
};
pub use validation::CredentialIssue;
