use async_trait::async_trait;

use crate::database::DbError;
use crate::database::models::team::TeamMemberEntity;

/// 团队成员存储库
#[async_trait]
pub trait TeamRepository: Send {
    /// 按创建时间倒序分页
    async fn list_sub_users(
        &mut self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TeamMemberEntity>, DbError>;

    async fn count_sub_users(&mut self, user_id: &str) -> Result<i64, DbError>;

    async fn add_sub_user(&mut self, member: &TeamMemberEntity) -> Result<(), DbError>;

    /// 只删除属于 user_id 的关系，返回删除的行数
    async fn del_sub_user(&mut self, user_id: &str, id: &str) -> Result<u64, DbError>;
}
