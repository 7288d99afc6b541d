use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::database::DbHandle;
use crate::error::AppError;

/// 为每个请求取一个数据库连接放入请求扩展，请求结束后归还
///
/// 取连接失败时直接返回数据库错误，不再进入后续拦截器。
/// 下游 panic 时本函数的 future 被丢弃，连接随最后一个句柄 Drop 归还。
pub async fn db_handle(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, path = %req.uri().path(), "acquire db connection failed");
            return AppError::Db.into_response();
        }
    };

    let handle = DbHandle::new(conn);
    req.extensions_mut().insert(handle.clone());

    let response = next.run(req).await;
    handle.release().await;
    response
}
