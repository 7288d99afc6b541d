/// 数据库实体
pub mod team;
pub mod user;
