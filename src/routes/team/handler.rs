use axum::extract::{Json, State};

use crate::AppState;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery, RequestContext};
use crate::routes::EmptyResponse;
use crate::services::SubUserList;

use super::model::{AddSubUserRequest, DelSubUserRequest, SubUserListQuery};

#[axum::debug_handler]
pub async fn sub_user_list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiQuery(query): ApiQuery<SubUserListQuery>,
) -> Result<Json<SubUserList>, AppError> {
    let user_id = ctx.user_id()?.to_string();

    let mut conn = ctx.db.lock().await;
    let list = state
        .teams
        .sub_user_list(&mut **conn, &user_id, query.pager())
        .await?;
    Ok(Json(list))
}

#[axum::debug_handler]
pub async fn add_sub_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<AddSubUserRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    if req.phone.trim().is_empty() {
        return Err(AppError::ReqParam("phone entered incorrectly; ".to_string()));
    }
    let user_id = ctx.user_id()?.to_string();

    let mut conn = ctx.db.lock().await;
    state
        .teams
        .add_sub_user(&mut **conn, &user_id, &req.phone)
        .await?;
    Ok(Json(EmptyResponse {}))
}

#[axum::debug_handler]
pub async fn del_sub_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<DelSubUserRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    if req.id.is_empty() {
        return Err(AppError::ReqParam("id entered incorrectly; ".to_string()));
    }
    let user_id = ctx.user_id()?.to_string();

    let mut conn = ctx.db.lock().await;
    state
        .teams
        .del_sub_user(&mut **conn, &user_id, &req.id)
        .await?;
    Ok(Json(EmptyResponse {}))
}
