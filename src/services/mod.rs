// 业务服务层，连接由调用方从请求上下文中传入

pub mod team;
pub mod user;

pub use team::{Pager, SubUser, SubUserList, TeamService};
pub use user::{LoginOutcome, PasswordChange, Registration, UserService};
