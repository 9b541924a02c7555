//! Repository for the `user_sessions` table.
//!
//! Sessions are append-only: they are created active and can only ever be
//! deactivated. Nothing here deletes a row.

use homedash_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

use crate::models::session::{CreateSession, UserSession};
use crate::models::user::User;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, session_token_hash, expires_at, is_active, created_at";

/// User columns qualified for the session/user join.
const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.salt, \
                             u.first_name, u.last_name, u.phone, u.job_title, u.department, \
                             u.location, u.bio, u.avatar_url, u.failed_attempts, \
                             u.locked_until, u.last_login, u.created_at, u.updated_at";

/// Provides persistence operations for user sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(
        pool: &DbPool,
        input: &CreateSession,
        now: Timestamp,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, session_token_hash, expires_at, is_active, created_at)
             VALUES ($1, $2, $3, true, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.session_token_hash)
            .bind(input.expires_at)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Resolve a token hash to its owning user.
    ///
    /// Only returns a user when the session is active and `expires_at > now`.
    pub async fn find_active_user(
        pool: &DbPool,
        hash: &str,
        now: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS}
             FROM user_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.session_token_hash = $1
               AND s.is_active = true
               AND s.expires_at > $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate the session with the given token hash.
    ///
    /// Returns `true` if an active session was deactivated. Unknown or already
    /// inactive tokens are not an error.
    pub async fn deactivate(pool: &DbPool, hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = false
             WHERE session_token_hash = $1 AND is_active = true",
        )
        .bind(hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate all active sessions for a user. Returns the count deactivated.
    pub async fn deactivate_all_for_user<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = false
             WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
