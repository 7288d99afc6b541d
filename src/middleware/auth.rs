use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::AppError;
use crate::extractors::AuthUser;

pub const TOKEN_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "user_id";

/// 无需登录即可访问的路径，按完整路径精确匹配
pub const AUTH_EXEMPT_PATHS: [&str; 4] = [
    "/v1/api/user/login",
    "/v1/api/user/modify_password",
    "/v1/api/user/register",
    "/v1/api/sms_record/receive_report",
];

pub fn is_auth_exempt(path: &str) -> bool {
    AUTH_EXEMPT_PATHS.contains(&path)
}

/// 校验 `token` / `user_id` Cookie，通过后把用户写入请求扩展
pub async fn auth_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_auth_exempt(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let (Some(token), Some(user_id)) = (jar.get(TOKEN_COOKIE), jar.get(USER_ID_COOKIE)) else {
        tracing::debug!(path = %req.uri().path(), "missing session cookies");
        return Err(AppError::UserTokenError);
    };

    state
        .sessions
        .check_token(token.value(), user_id.value())
        .await?;

    req.extensions_mut()
        .insert(AuthUser(user_id.value().to_string()));
    Ok(next.run(req).await)
}
