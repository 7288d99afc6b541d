use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::database::{DbConn, TeamMemberEntity, TeamRepository, UserEntity, UserRepository};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// 保证 `offset` 不溢出
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub page: i64,
    pub page_size: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

impl Pager {
    /// 页码从 1 开始，非法值回落到默认值
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page_size = match page_size {
            Some(size) if size > 0 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1).min(MAX_PAGE),
            page_size,
            total_rows: 0,
            total_pages: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    fn with_total(mut self, total_rows: i64) -> Self {
        self.total_rows = total_rows;
        self.total_pages = (total_rows + self.page_size - 1) / self.page_size;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubUser {
    pub id: String,
    pub sub_user_id: String,
    pub user_id: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubUserList {
    pub pager: Pager,
    pub list: Vec<SubUser>,
}

/// 主账号下的子账号管理
#[derive(Clone, Default)]
pub struct TeamService;

impl TeamService {
    pub fn new() -> Self {
        Self
    }

    pub async fn sub_user_list(
        &self,
        conn: &mut dyn DbConn,
        user_id: &str,
        pager: Pager,
    ) -> Result<SubUserList, AppError> {
        let total_rows = conn.count_sub_users(user_id).await?;
        let members = conn
            .list_sub_users(user_id, pager.offset(), pager.page_size)
            .await?;

        let ids: Vec<String> = members.iter().map(|m| m.sub_user_id.clone()).collect();
        let details: HashMap<String, UserEntity> = conn
            .find_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let list = members
            .into_iter()
            .map(|member| {
                let (name, phone) = details
                    .get(&member.sub_user_id)
                    .map(|u| (u.name.clone(), u.phone.clone()))
                    .unwrap_or_default();
                SubUser {
                    id: member.id,
                    sub_user_id: member.sub_user_id,
                    user_id: member.user_id,
                    name,
                    phone,
                }
            })
            .collect();

        Ok(SubUserList {
            pager: pager.with_total(total_rows),
            list,
        })
    }

    /// 按手机号把已注册用户加入当前用户的团队
    pub async fn add_sub_user(
        &self,
        conn: &mut dyn DbConn,
        user_id: &str,
        phone: &str,
    ) -> Result<String, AppError> {
        let sub_user = conn
            .find_user_by_phone(phone)
            .await?
            .ok_or(AppError::UserNotExists)?;

        let member = TeamMemberEntity::new(user_id, &sub_user.id);
        conn.add_sub_user(&member).await?;
        tracing::info!(user_id, sub_user_id = %sub_user.id, "sub user added");
        Ok(member.id)
    }

    /// 只删除属于 user_id 的关系，记录不存在时同样返回成功
    pub async fn del_sub_user(
        &self,
        conn: &mut dyn DbConn,
        user_id: &str,
        id: &str,
    ) -> Result<(), AppError> {
        let removed = conn.del_sub_user(user_id, id).await?;
        if removed == 0 {
            tracing::debug!(user_id, id, "no sub user relation removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, MemoryDatabase, NewUser};
    use crate::error::error_codes;

    async fn seed(conn: &mut dyn DbConn, id: &str, name: &str, phone: &str) {
        conn.insert_user(&NewUser {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            password_hash: String::new(),
        })
        .await
        .unwrap();
    }

    #[test]
    fn pager_normalizes_input() {
        let pager = Pager::new(None, None);
        assert_eq!((pager.page, pager.page_size), (1, DEFAULT_PAGE_SIZE));

        let pager = Pager::new(Some(0), Some(-5));
        assert_eq!((pager.page, pager.page_size), (1, DEFAULT_PAGE_SIZE));

        let pager = Pager::new(Some(3), Some(1000));
        assert_eq!((pager.page, pager.page_size), (3, MAX_PAGE_SIZE));
        assert_eq!(pager.offset(), 2 * MAX_PAGE_SIZE);

        assert_eq!(Pager::new(Some(1), Some(2)).with_total(5).total_pages, 3);
        assert_eq!(Pager::new(Some(1), Some(2)).with_total(0).total_pages, 0);
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let pager = Pager::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(pager.page, MAX_PAGE);
        assert_eq!(pager.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
        assert!(pager.offset() > 0);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let db = MemoryDatabase::new();
        let mut conn = db.acquire().await.unwrap();
        seed(conn.as_mut(), "owner", "Owner", "13800000000").await;
        seed(conn.as_mut(), "m1", "Member One", "13800000001").await;

        let teams = TeamService::new();
        teams
            .add_sub_user(conn.as_mut(), "owner", "13800000001")
            .await
            .unwrap();

        let page = teams
            .sub_user_list(conn.as_mut(), "owner", Pager::new(Some(i64::MAX), Some(100)))
            .await
            .unwrap();
        assert_eq!(page.pager.total_rows, 1);
        assert!(page.list.is_empty());
    }

    #[tokio::test]
    async fn sub_user_list_joins_member_details() {
        let db = MemoryDatabase::new();
        let mut conn = db.acquire().await.unwrap();
        seed(conn.as_mut(), "owner", "Owner", "13800000000").await;
        seed(conn.as_mut(), "m1", "Member One", "13800000001").await;
        seed(conn.as_mut(), "m2", "Member Two", "13800000002").await;

        let teams = TeamService::new();
        teams
            .add_sub_user(conn.as_mut(), "owner", "13800000001")
            .await
            .unwrap();
        teams
            .add_sub_user(conn.as_mut(), "owner", "13800000002")
            .await
            .unwrap();

        let page = teams
            .sub_user_list(conn.as_mut(), "owner", Pager::new(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.pager.total_rows, 2);
        assert_eq!(page.pager.total_pages, 2);
        assert_eq!(page.list.len(), 1);

        let all = teams
            .sub_user_list(conn.as_mut(), "owner", Pager::new(None, None))
            .await
            .unwrap();
        let mut phones: Vec<&str> = all.list.iter().map(|s| s.phone.as_str()).collect();
        phones.sort();
        assert_eq!(phones, vec!["13800000001", "13800000002"]);
        assert!(all.list.iter().all(|s| s.user_id == "owner"));
    }

    #[tokio::test]
    async fn add_sub_user_requires_registered_phone() {
        let db = MemoryDatabase::new();
        let mut conn = db.acquire().await.unwrap();

        let err = TeamService::new()
            .add_sub_user(conn.as_mut(), "owner", "13800000009")
            .await
            .unwrap_err();
        assert_eq!(err.code(), error_codes::USER_NOT_EXISTS);
    }

    #[tokio::test]
    async fn del_sub_user_only_touches_own_relations() {
        let db = MemoryDatabase::new();
        let mut conn = db.acquire().await.unwrap();
        seed(conn.as_mut(), "m1", "Member One", "13800000001").await;

        let teams = TeamService::new();
        let id = teams
            .add_sub_user(conn.as_mut(), "owner", "13800000001")
            .await
            .unwrap();

        teams
            .del_sub_user(conn.as_mut(), "intruder", &id)
            .await
            .unwrap();
        assert_eq!(conn.count_sub_users("owner").await.unwrap(), 1);

        teams.del_sub_user(conn.as_mut(), "owner", &id).await.unwrap();
        assert_eq!(conn.count_sub_users("owner").await.unwrap(), 0);
    }
}
