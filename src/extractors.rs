//! 请求级提取器
//!
//! 拦截器把数据库句柄和登录用户写入请求扩展，处理函数通过 [`RequestContext`]
//! 或 [`AuthUser`] 以强类型取回，不再按字符串键读取。

use axum::extract::{FromRequest, FromRequestParts, Json, Query};
use axum::http::request::Parts;

use crate::database::DbHandle;
use crate::error::AppError;

/// 通过认证的用户 ID，由认证拦截器写入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::UserTokenError)
    }
}

/// 单个请求的上下文
#[derive(Clone)]
pub struct RequestContext {
    pub db: DbHandle,
    /// 白名单路由上为 `None`
    pub user: Option<AuthUser>,
}

impl RequestContext {
    pub fn user_id(&self) -> Result<&str, AppError> {
        self.user
            .as_ref()
            .map(|user| user.0.as_str())
            .ok_or(AppError::UserTokenError)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let db = parts.extensions.get::<DbHandle>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "request reached handler without db handle");
            AppError::Internal
        })?;

        Ok(Self {
            db,
            user: parts.extensions.get::<AuthUser>().cloned(),
        })
    }
}

/// JSON 请求体，解析失败返回参数错误
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// 查询参数，解析失败返回参数错误
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
