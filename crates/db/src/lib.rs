//! Row-store adapter for the authentication subsystem.
//!
//! The store is a local SQLite database opened in WAL mode. All access goes
//! through an explicitly passed [`DbPool`]; there is no global connection.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// Connection settings for [`create_pool`].
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Upper bound on pooled connections. SQLite allows one writer at a time,
    /// so the default keeps a single connection.
    pub max_connections: u32,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 1,
            busy_timeout: Duration::from_millis(30_000),
        }
    }
}

/// Create a connection pool from a database URL.
///
/// The database file and its directory are created if missing. Every connection enables foreign
/// keys, WAL journaling and `synchronous = NORMAL`.
pub async fn create_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(settings.busy_timeout);

    if let Some(dir) = options.get_filename().parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::debug!("Auth schema migrations applied");
    Ok(())
}
