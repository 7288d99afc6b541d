use axum::Json;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;
use crate::database::DbError;

pub mod error_codes {
    pub const DB_ERROR: i32 = 10010001;
    pub const REQ_PARAM_ERROR: i32 = 10010002;
    pub const CACHE_ERROR: i32 = 10010003;
    pub const PANIC_ERROR: i32 = 10010004;
    pub const INTERNAL_ERROR: i32 = 10010005;

    pub const USER_PHONE_EXISTS: i32 = 10020001;
    pub const USER_CONFIRM_PASSWORD_INCORRECT: i32 = 10020002;
    pub const USER_LOGIN_FAILED: i32 = 10020003;
    pub const USER_MODIFY_PASSWORD_FAILED: i32 = 10020004;
    pub const USER_TOKEN_ERROR: i32 = 10020005;
    pub const USER_NOT_EXISTS: i32 = 10020006;
}

/// 返回给调用方的业务错误，HTTP 状态码始终为 200，以 error_code 区分
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("数据库错误")]
    Db,
    #[error("{0}")]
    ReqParam(String),
    #[error("缓存错误")]
    Cache,
    #[error("服务内部异常")]
    Panic,
    #[error("服务器内部错误")]
    Internal,
    #[error("手机号已经存在")]
    UserPhoneExists,
    #[error("两次输入的密码不一致")]
    UserConfirmPasswordIncorrect,
    #[error("手机号或密码错误")]
    UserLoginFailed,
    #[error("修改密码失败")]
    UserModifyPasswordFailed,
    #[error("登录已失效，请重新登录")]
    UserTokenError,
    #[error("用户不存在")]
    UserNotExists,
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::Db => error_codes::DB_ERROR,
            AppError::ReqParam(_) => error_codes::REQ_PARAM_ERROR,
            AppError::Cache => error_codes::CACHE_ERROR,
            AppError::Panic => error_codes::PANIC_ERROR,
            AppError::Internal => error_codes::INTERNAL_ERROR,
            AppError::UserPhoneExists => error_codes::USER_PHONE_EXISTS,
            AppError::UserConfirmPasswordIncorrect => error_codes::USER_CONFIRM_PASSWORD_INCORRECT,
            AppError::UserLoginFailed => error_codes::USER_LOGIN_FAILED,
            AppError::UserModifyPasswordFailed => error_codes::USER_MODIFY_PASSWORD_FAILED,
            AppError::UserTokenError => error_codes::USER_TOKEN_ERROR,
            AppError::UserNotExists => error_codes::USER_NOT_EXISTS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: i32,
    pub error_msg: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            error_code: err.code(),
            error_msg: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ReqParam(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ReqParam(rejection.body_text())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "database operation failed");
        AppError::Db
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        tracing::error!(error = %err, "cache operation failed");
        AppError::Cache
    }
}
