/// 存储库接口
pub mod team;
pub mod user;
