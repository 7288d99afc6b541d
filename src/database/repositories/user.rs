use async_trait::async_trait;

use crate::database::DbError;
use crate::database::models::user::{NewUser, ProfileUpdate, UserEntity};

/// 用户存储库，查询均忽略已软删除的用户
#[async_trait]
pub trait UserRepository: Send {
    async fn find_user_by_id(&mut self, id: &str) -> Result<Option<UserEntity>, DbError>;

    async fn find_user_by_phone(&mut self, phone: &str) -> Result<Option<UserEntity>, DbError>;

    async fn find_users_by_ids(&mut self, ids: &[String]) -> Result<Vec<UserEntity>, DbError>;

    /// 手机号重复时返回 `DbError::Duplicate`
    async fn insert_user(&mut self, user: &NewUser) -> Result<(), DbError>;

    async fn update_password(&mut self, id: &str, password_hash: &str) -> Result<(), DbError>;

    /// 手机号与其他用户重复时返回 `DbError::Duplicate`
    async fn update_profile(&mut self, id: &str, profile: &ProfileUpdate) -> Result<(), DbError>;
}
