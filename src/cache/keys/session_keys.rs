/// 用户ID -> token 的缓存键前缀
const SESSION_USER_ID_PREFIX: &str = "session:user_id:";

/// token -> 用户ID 的缓存键前缀
const SESSION_TOKEN_PREFIX: &str = "session:token:";

/// 生成用户会话缓存键，登出时用它找到当前 token
pub fn user_id_key(user_id: &str) -> String {
    format!("{}{}", SESSION_USER_ID_PREFIX, user_id)
}

/// 生成 token 缓存键，校验登录态时以此为准
pub fn token_key(token: &str) -> String {
    format!("{}{}", SESSION_TOKEN_PREFIX, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_purpose() {
        assert_eq!(user_id_key("u-1"), "session:user_id:u-1");
        assert_eq!(token_key("abc"), "session:token:abc");
        assert_ne!(user_id_key("same"), token_key("same"));
    }
}
