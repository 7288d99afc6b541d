use std::sync::Arc;

use crate::cache::CacheClient;
use crate::cache::keys::session_keys;
use crate::error::AppError;

/// 登录会话存储
///
/// 每个会话对应两条缓存记录：`session:user_id:{user_id}` 保存当前 token，
/// `session:token:{token}` 保存所属用户。两条记录独立写入、TTL 相同，
/// 不保证原子性。校验只看 token 记录，用户记录仅用于按用户清理会话。
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn CacheClient>,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn CacheClient>) -> Self {
        Self { cache }
    }

    /// 写入会话，任一写入失败即返回缓存错误，已写入的记录不回滚
    pub async fn set_session(
        &self,
        user_id: &str,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), AppError> {
        let user_key = session_keys::user_id_key(user_id);
        if let Err(e) = self.cache.set_ex(&user_key, token, ttl_secs).await {
            tracing::error!(error = %e, user_id, "SetSession user->token write failed");
            return Err(AppError::Cache);
        }

        let token_key = session_keys::token_key(token);
        if let Err(e) = self.cache.set_ex(&token_key, user_id, ttl_secs).await {
            tracing::error!(error = %e, user_id, "SetSession token->user write failed");
            return Err(AppError::Cache);
        }

        Ok(())
    }

    /// 清理用户当前会话，没有会话时直接返回成功；删除失败只记录日志
    pub async fn clear_session(&self, user_id: &str) -> Result<(), AppError> {
        let user_key = session_keys::user_id_key(user_id);
        let token = match self.cache.get(&user_key).await {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, user_id, "ClearSession lookup failed");
                return Ok(());
            }
        };

        if let Err(e) = self.cache.del(&session_keys::token_key(&token)).await {
            tracing::error!(error = %e, user_id, "ClearSession del token err");
        }
        if let Err(e) = self.cache.del(&user_key).await {
            tracing::error!(error = %e, user_id, "ClearSession del user_id err");
        }
        Ok(())
    }

    /// 校验 token 是否属于 user_id
    pub async fn check_token(&self, token: &str, user_id: &str) -> Result<(), AppError> {
        let owner = self
            .cache
            .get(&session_keys::token_key(token))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "CheckToken lookup failed");
                AppError::Cache
            })?;

        match owner {
            Some(owner) if !owner.is_empty() && owner == user_id => Ok(()),
            _ => Err(AppError::UserTokenError),
        }
    }
}
