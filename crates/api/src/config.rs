use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use homedash_db::PoolSettings;

use crate::auth::service::AuthConfig;

/// Default location of the local dashboard database.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/dashboard.db";

/// Read `key` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but cannot be parsed as `T`. Misconfiguration
/// fails at startup rather than silently using the default.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid value: {e}")),
        Err(_) => default,
    }
}

/// Local database settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (default: `sqlite://data/dashboard.db`).
    pub url: String,
    /// Pool size. The store tolerates a single writer, so the default is `1`.
    pub max_connections: u32,
    /// How long a statement waits on a locked database (default: 30s).
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// | Env Var              | Default                      |
    /// |----------------------|------------------------------|
    /// | `DATABASE_URL`       | `sqlite://data/dashboard.db` |
    /// | `DB_MAX_CONNECTIONS` | `1`                          |
    /// | `DB_BUSY_TIMEOUT_MS` | `30000`                      |
    pub fn from_env() -> Self {
        let defaults = PoolSettings::default();
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            busy_timeout: Duration::from_millis(env_or(
                "DB_BUSY_TIMEOUT_MS",
                defaults.busy_timeout.as_millis() as u64,
            )),
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            busy_timeout: self.busy_timeout,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single desktop install.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database: DatabaseConfig,
    /// Lockout, session lifetime and hashing policy.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `127.0.0.1`                |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Database and auth variables are documented on [`DatabaseConfig::from_env`]
    /// and [`AuthConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }
}
