use axum::extract::{Json, State};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;

use crate::AppState;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery, AuthUser, RequestContext};
use crate::middleware::{TOKEN_COOKIE, USER_ID_COOKIE};
use crate::routes::EmptyResponse;

use super::model::{
    LoginRequest, LoginResponse, ModifyPasswordRequest, ProfileQuery, RegisterRequest,
    SaveProfileRequest, UserProfile,
};

fn session_cookie(name: &'static str, value: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(time::Duration::seconds(
            i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    req.validate()?;

    let mut conn = ctx.db.lock().await;
    state
        .users
        .register(&mut **conn, req.as_registration())
        .await?;
    Ok(Json(EmptyResponse {}))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    req.validate()?;

    let outcome = {
        let mut conn = ctx.db.lock().await;
        state
            .users
            .login(&mut **conn, &req.phone, &req.password)
            .await?
    };

    let ttl = state.users.session_ttl_secs();
    let jar = jar
        .add(session_cookie(TOKEN_COOKIE, outcome.token, ttl))
        .add(session_cookie(USER_ID_COOKIE, outcome.user_id.clone(), ttl));
    Ok((
        jar,
        Json(LoginResponse {
            user_id: outcome.user_id,
        }),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<EmptyResponse>), AppError> {
    state.users.logout(&user_id).await?;

    let jar = jar
        .remove(expired_cookie(TOKEN_COOKIE))
        .remove(expired_cookie(USER_ID_COOKIE));
    Ok((jar, Json(EmptyResponse {})))
}

#[axum::debug_handler]
pub async fn modify_password(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<ModifyPasswordRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    req.validate()?;

    let mut conn = ctx.db.lock().await;
    state
        .users
        .modify_password(&mut **conn, req.as_change())
        .await?;
    Ok(Json(EmptyResponse {}))
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiQuery(query): ApiQuery<ProfileQuery>,
) -> Result<Json<UserProfile>, AppError> {
    // 未指定 user_id 时查看自己
    let user_id = match query.user_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => ctx.user_id()?.to_string(),
    };

    let mut conn = ctx.db.lock().await;
    let user = state.users.profile(&mut **conn, &user_id).await?;
    Ok(Json(UserProfile::from(user)))
}

#[axum::debug_handler]
pub async fn save_profile(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<SaveProfileRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    req.validate()?;
    let user_id = ctx.user_id()?.to_string();

    let mut conn = ctx.db.lock().await;
    state
        .users
        .save_profile(&mut **conn, &user_id, &req.into())
        .await?;
    Ok(Json(EmptyResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_uses_ttl_as_max_age() {
        let cookie = session_cookie(TOKEN_COOKIE, "t".to_string(), 3600);
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn oversized_ttl_saturates_max_age() {
        let cookie = session_cookie(TOKEN_COOKIE, "t".to_string(), u64::MAX);
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(i64::MAX)));
    }
}
