use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use shop_management::{
    AppState,
    cache::RedisCache,
    config::Config,
    database::PgDatabase,
    middleware::install_panic_hook,
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
    install_panic_hook();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 数据库连接池
    let db = PgDatabase::connect(&config)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // 会话缓存
    let cache = RedisCache::open(&config.redis_url).expect("Failed to create Redis client");

    let state = AppState::new(config.clone(), Arc::new(db), Arc::new(cache));
    let app = create_router(state);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
