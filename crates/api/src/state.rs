use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: homedash_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Authentication service sharing the same pool.
    pub auth: AuthService,
}

impl AppState {
    pub fn new(pool: homedash_db::DbPool, config: ServerConfig) -> Self {
        let auth = AuthService::new(pool.clone(), config.auth.clone());
        Self {
            pool,
            config: Arc::new(config),
            auth,
        }
    }
}
