use std::sync::Arc;

use cache::{CacheClient, SessionStore};
use config::Config;
use database::Database;
use services::{TeamService, UserService};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub sessions: SessionStore,
    pub users: UserService,
    pub teams: TeamService,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn Database>, cache: Arc<dyn CacheClient>) -> Self {
        let sessions = SessionStore::new(cache);
        Self {
            users: UserService::new(sessions.clone(), &config),
            teams: TeamService::new(),
            sessions,
            db,
            config,
        }
    }
}
