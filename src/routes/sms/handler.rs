use axum::extract::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::routes::EmptyResponse;

/// 短信服务商的回执推送，只记录日志
#[axum::debug_handler]
pub async fn receive_report(
    ApiJson(report): ApiJson<Value>,
) -> Result<Json<EmptyResponse>, AppError> {
    tracing::info!(report = %report, "sms delivery report received");
    Ok(Json(EmptyResponse {}))
}
