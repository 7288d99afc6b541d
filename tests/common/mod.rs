//! 集成测试公共设施：在临时端口上启动完整的路由和拦截器链，
//! 数据库和缓存使用进程内实现。

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use serde_json::{Value, json};
use shop_management::{
    AppState,
    cache::MemoryCache,
    config::Config,
    database::{Database, MemoryDatabase},
    router::{api_routes, with_interceptors},
};

pub const PHONE: &str = "13800000000";
pub const PASSWORD: &str = "secret1";

pub struct TestApp {
    pub base: String,
    pub db: MemoryDatabase,
    pub cache: Arc<MemoryCache>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        ..Config::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_with_routes(api_routes()).await
}

/// 在业务路由之外追加测试专用路由
pub async fn spawn_with_routes(routes: Router<AppState>) -> TestApp {
    let db = MemoryDatabase::new();
    let cache = Arc::new(MemoryCache::new());
    let state = AppState::new(test_config(), Arc::new(db.clone()), cache.clone());
    let (base, shutdown) = serve(with_interceptors(routes, state)).await;
    TestApp {
        base,
        db,
        cache,
        shutdown: Some(shutdown),
    }
}

/// 使用指定的数据库实现启动
pub async fn spawn_with_database(db: Arc<dyn Database>) -> (String, tokio::sync::oneshot::Sender<()>) {
    let state = AppState::new(test_config(), db, Arc::new(MemoryCache::new()));
    serve(with_interceptors(api_routes(), state)).await
}

async fn serve(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx)
}

/// 保存 Cookie 的客户端，登录后自动携带会话
pub fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

pub async fn register(client: &reqwest::Client, app: &TestApp, name: &str, phone: &str) -> Value {
    client
        .post(app.url("/v1/api/user/register"))
        .json(&json!({
            "name": name,
            "phone": phone,
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

pub async fn login(client: &reqwest::Client, app: &TestApp, phone: &str, password: &str) -> reqwest::Response {
    client
        .post(app.url("/v1/api/user/login"))
        .json(&json!({ "phone": phone, "password": password }))
        .send()
        .await
        .unwrap()
}

/// 解析 Set-Cookie 中指定名称的值
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let pair = v.split(';').next()?;
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
}

pub fn error_code(body: &Value) -> Option<i64> {
    body.get("error_code").and_then(Value::as_i64)
}
