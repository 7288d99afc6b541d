/// 缓存键模块
/// 提供各种缓存键生成函数

// 会话缓存键模块
pub mod session_keys;

pub use session_keys::{token_key, user_id_key};
