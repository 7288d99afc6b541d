// 请求拦截器，挂载顺序见 router::with_interceptors
mod auth;
mod cors;
mod db;
mod panic;

pub use auth::{AUTH_EXEMPT_PATHS, TOKEN_COOKIE, USER_ID_COOKIE, auth_gate, is_auth_exempt};
pub use cors::cors;
pub use db::db_handle;
pub use panic::{install_panic_hook, panic_guard};
