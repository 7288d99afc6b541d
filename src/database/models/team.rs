use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 团队成员关系：主账号 user_id 下挂的子账号 sub_user_id
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMemberEntity {
    pub id: String,
    pub user_id: String,
    pub sub_user_id: String,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
}

impl TeamMemberEntity {
    pub fn new(user_id: &str, sub_user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            sub_user_id: sub_user_id.to_string(),
            create_time: now,
            modify_time: now,
        }
    }
}
