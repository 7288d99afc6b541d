use serde::{Deserialize, Serialize};

pub mod sms;
pub mod team;
pub mod user;

/// 无返回数据的成功响应 `{}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmptyResponse {}
