// ==========================================
// 徒步旅行预订系统 - 密码哈希与令牌
// ==========================================
// PBKDF2-HMAC-SHA256，16 字节随机盐，32 字节密钥，base64 存储
// ==========================================

use crate::repository::user_repo::CredentialEntity;
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD};
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// 使用新盐对密码做哈希
pub fn hash_password(password: &str, iterations: u32) -> CredentialEntity {
    let iterations = iterations.max(1);
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, iterations);
    CredentialEntity {
        password_hash: B64.encode(key),
        password_salt: B64.encode(salt),
        iterations,
    }
}

/// 校验密码与已存凭据是否匹配
///
/// 无法解码的存储值视为不匹配
pub fn verify_password(password: &str, stored: &CredentialEntity) -> bool {
    if password.is_empty() {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (
        B64.decode(stored.password_salt.as_str()),
        B64.decode(stored.password_hash.as_str()),
    ) else {
        return false;
    };
    let key = derive_key(password, &salt, stored.iterations.max(1));
    constant_time_eq(&key, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 会话与密码重置链接使用的不透明令牌
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

const TOKEN_HINT_LEN: usize = 6;

/// 令牌的前几个字符，可安全写入日志
pub fn token_hint(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_HINT_LEN).collect();
    format!("{}…", head)
}
