// 缓存模块
// 目前仅用于保存登录会话

use async_trait::async_trait;

pub mod keys;
pub mod memory;
pub mod operations;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use operations::session::SessionStore;
pub use redis_cache::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// 键值缓存客户端，所有写入都带过期时间
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;
}
