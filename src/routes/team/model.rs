use serde::Deserialize;

use crate::services::Pager;

/// 分页参数沿用 `pager.page` / `pager.page_size` 的查询串格式
#[derive(Debug, Deserialize)]
pub struct SubUserListQuery {
    #[serde(rename = "pager.page")]
    pub page: Option<i64>,
    #[serde(rename = "pager.page_size")]
    pub page_size: Option<i64>,
}

impl SubUserListQuery {
    pub fn pager(&self) -> Pager {
        Pager::new(self.page, self.page_size)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSubUserRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct DelSubUserRequest {
    #[serde(default)]
    pub id: String,
}
