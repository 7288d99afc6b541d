use bcrypt::{hash, verify};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::AppError;

/// 会话 token 的随机字节数，十六进制编码后为 48 个字符
const SESSION_TOKEN_BYTES: usize = 24;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 从系统随机源生成会话 token
///
/// 随机源不可用时返回错误，不会返回空字符串。
pub fn generate_session_token() -> Result<String, AppError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        AppError::Internal
    })?;
    Ok(hex::encode(bytes))
}
