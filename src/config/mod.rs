use std::env;
use std::time::Duration;

/// 登录会话默认有效期：3 天
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600 * 24 * 3;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_ttl_secs: u64,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
    /// 为空时回显请求的 Origin
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: String::new(),
            redis_url: String::new(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            db_max_connections: 10,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_allow_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let session_ttl_secs = env::var("SESSION_TTL")
            .ok()
            .and_then(|v| v.trim_end_matches('s').parse::<u64>().ok())
            .unwrap_or(defaults.session_ttl_secs);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            session_ttl_secs,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
