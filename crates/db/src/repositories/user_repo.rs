//! Repository for the `users` table.

use homedash_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

use crate::models::user::{CreateUser, FailedLogin, UpdateProfile, User};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, salt, first_name, last_name, \
                        phone, job_title, department, location, bio, avatar_url, \
                        failed_attempts, locked_until, last_login, created_at, updated_at";

/// Provides persistence operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a clean security state, returning the created row.
    pub async fn create(
        pool: &DbPool,
        input: &CreateUser,
        now: Timestamp,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (username, email, password_hash, salt, first_name, last_name,
                 failed_attempts, locked_until, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, 0, NULL, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.salt)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user whose username equals `username` OR whose email equals `email`.
    ///
    /// Login passes the same identifier for both. Comparison is case-sensitive.
    pub async fn find_by_username_or_email(
        pool: &DbPool,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1 OR email = $2 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find any account, other than `exclude_id`, that already uses either
    /// identifier in either column.
    ///
    /// Usernames and emails share one login namespace, so a new username must
    /// not equal an existing email and vice versa.
    pub async fn find_identity_conflict(
        pool: &DbPool,
        username: &str,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE (username IN ($1, $2) OR email IN ($1, $2))
               AND ($3 IS NULL OR id <> $3)
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed login in a single statement.
    ///
    /// The counter is incremented and, once it reaches `max_attempts`,
    /// `locked_until` is set to `lock_until`. If a previous lock has already
    /// lapsed at `now`, counting restarts at 1. Returns `None` if the user is gone.
    pub async fn record_failed_login(
        pool: &DbPool,
        id: DbId,
        now: Timestamp,
        max_attempts: i64,
        lock_until: Timestamp,
    ) -> Result<Option<FailedLogin>, sqlx::Error> {
        sqlx::query_as::<_, FailedLogin>(
            "UPDATE users SET
                failed_attempts = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN 1
                    ELSE failed_attempts + 1
                END,
                locked_until = CASE
                    WHEN (CASE
                            WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN 1
                            ELSE failed_attempts + 1
                          END) >= $3 THEN $4
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN NULL
                    ELSE locked_until
                END,
                updated_at = $2
             WHERE id = $1
             RETURNING failed_attempts, locked_until",
        )
        .bind(id)
        .bind(now)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_optional(pool)
        .await
    }

    /// Record a successful login: reset `failed_attempts` to 0, clear
    /// `locked_until`, and set `last_login` to `now`.
    pub async fn record_successful_login(
        pool: &DbPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_attempts = 0,
                locked_until = NULL,
                last_login = $2,
                updated_at = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Apply an allow-listed profile update.
    ///
    /// Absent fields keep their column value. An optional attribute present
    /// as `None` is written as NULL. `email` is only ever replaced, never cleared.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &DbPool,
        id: DbId,
        input: &UpdateProfile,
        now: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                first_name = CASE WHEN $2 THEN $3 ELSE first_name END,
                last_name = CASE WHEN $4 THEN $5 ELSE last_name END,
                email = COALESCE($6, email),
                phone = CASE WHEN $7 THEN $8 ELSE phone END,
                job_title = CASE WHEN $9 THEN $10 ELSE job_title END,
                department = CASE WHEN $11 THEN $12 ELSE department END,
                location = CASE WHEN $13 THEN $14 ELSE location END,
                bio = CASE WHEN $15 THEN $16 ELSE bio END,
                avatar_url = CASE WHEN $17 THEN $18 ELSE avatar_url END,
                updated_at = $19
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.first_name.is_some())
            .bind(input.first_name.as_ref().and_then(|v| v.as_deref()))
            .bind(input.last_name.is_some())
            .bind(input.last_name.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.email)
            .bind(input.phone.is_some())
            .bind(input.phone.as_ref().and_then(|v| v.as_deref()))
            .bind(input.job_title.is_some())
            .bind(input.job_title.as_ref().and_then(|v| v.as_deref()))
            .bind(input.department.is_some())
            .bind(input.department.as_ref().and_then(|v| v.as_deref()))
            .bind(input.location.is_some())
            .bind(input.location.as_ref().and_then(|v| v.as_deref()))
            .bind(input.bio.is_some())
            .bind(input.bio.as_ref().and_then(|v| v.as_deref()))
            .bind(input.avatar_url.is_some())
            .bind(input.avatar_url.as_ref().and_then(|v| v.as_deref()))
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's password hash and salt. Returns `true` if the row was updated.
    ///
    /// Accepts any executor so it can run inside the password-change transaction.
    pub async fn update_password<'e, E>(
        executor: E,
        id: DbId,
        password_hash: &str,
        salt: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, salt = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(salt)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
