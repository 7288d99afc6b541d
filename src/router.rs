use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::middleware::{auth_gate, cors, db_handle, panic_guard};
use crate::routes;

/// 全部业务路由，尚未挂载拦截器
pub fn api_routes() -> Router<AppState> {
    let user_routes = Router::new()
        .route("/login", post(routes::user::login))
        .route("/register", post(routes::user::register))
        .route("/logout", post(routes::user::logout))
        .route("/modify_password", post(routes::user::modify_password))
        .route("/profile", get(routes::user::profile))
        .route("/save_profile", post(routes::user::save_profile));

    let team_routes = Router::new()
        .route("/sub_user_list", get(routes::team::sub_user_list))
        .route("/add_sub_user", post(routes::team::add_sub_user))
        .route("/del_sub_user", post(routes::team::del_sub_user));

    let sms_routes = Router::new().route("/receive_report", post(routes::sms::receive_report));

    Router::new()
        .nest("/v1/api/user", user_routes)
        .nest("/v1/api/user_team", team_routes)
        .nest("/v1/api/sms_record", sms_routes)
}

/// 挂载拦截器链并注入状态
///
/// 执行顺序由外到内：panic 保护、数据库句柄、CORS、认证。
/// `Router::layer` 后添加的在外层，所以这里按相反顺序添加。
pub fn with_interceptors(router: Router<AppState>, state: AppState) -> Router {
    router
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .layer(from_fn_with_state(state.clone(), cors))
        .layer(from_fn_with_state(state.clone(), db_handle))
        .layer(from_fn(panic_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn create_router(state: AppState) -> Router {
    with_interceptors(api_routes(), state)
}
