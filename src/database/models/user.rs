use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    /// 登录账号，全局唯一
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub avatar_url: String,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
    /// 预留的软删除时间，非空的用户视为不存在
    pub deleted_time: Option<DateTime<Utc>>,
}

/// 注册时写入的新用户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

/// 个人资料可修改的字段
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar_url: String,
}
