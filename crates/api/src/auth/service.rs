//! Registration, login, session and password-change protocol.
//!
//! [`AuthService`] is the only writer of user security state (failed attempts,
//! lock, last login, credentials) and of session rows. It holds an explicitly
//! injected pool handle; nothing here reaches for global state.

use chrono::{Duration, Utc};
use homedash_core::error::AuthError;
use homedash_core::password_policy::validate_password;
use homedash_core::types::DbId;
use homedash_db::models::session::CreateSession;
use homedash_db::models::user::{CreateUser, UpdateProfile, UserResponse};
use homedash_db::repositories::{SessionRepo, UserRepo};
use homedash_db::DbPool;
use serde::Serialize;

use crate::auth::password::{self, HashParams};
use crate::auth::token::{generate_session_token, hash_session_token};
use crate::config::env_or;
use crate::error::{AppError, AppResult};

/// Default consecutive failures before an account is locked.
const DEFAULT_MAX_FAILED_ATTEMPTS: i64 = 5;
/// Default lock duration in minutes.
const DEFAULT_LOCKOUT_MINS: i64 = 15;
/// Default session lifetime in hours.
const DEFAULT_SESSION_HOURS: i64 = 24;

/// Lockout, session and hashing policy.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub max_failed_attempts: i64,
    pub lockout_duration: Duration,
    pub session_duration: Duration,
    pub hash: HashParams,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_duration: Duration::minutes(DEFAULT_LOCKOUT_MINS),
            session_duration: Duration::hours(DEFAULT_SESSION_HOURS),
            hash: HashParams::default(),
        }
    }
}

impl AuthConfig {
    /// Load the auth policy from environment variables.
    ///
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `AUTH_MAX_FAILED_ATTEMPTS` | `5`      |
    /// | `AUTH_LOCKOUT_MINS`        | `15`     |
    /// | `AUTH_SESSION_HOURS`       | `24`     |
    /// | `AUTH_HASH_MEMORY_KIB`     | `19456`  |
    /// | `AUTH_HASH_ITERATIONS`     | `2`      |
    /// | `AUTH_HASH_PARALLELISM`    | `1`      |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but does not parse.
    pub fn from_env() -> Self {
        let defaults = HashParams::default();
        Self {
            max_failed_attempts: env_or("AUTH_MAX_FAILED_ATTEMPTS", DEFAULT_MAX_FAILED_ATTEMPTS),
            lockout_duration: Duration::minutes(env_or("AUTH_LOCKOUT_MINS", DEFAULT_LOCKOUT_MINS)),
            session_duration: Duration::hours(env_or("AUTH_SESSION_HOURS", DEFAULT_SESSION_HOURS)),
            hash: HashParams {
                memory_kib: env_or("AUTH_HASH_MEMORY_KIB", defaults.memory_kib),
                iterations: env_or("AUTH_HASH_ITERATIONS", defaults.iterations),
                parallelism: env_or("AUTH_HASH_PARALLELISM", defaults.parallelism),
            },
        }
    }
}

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Result of a successful [`AuthService::authenticate`].
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: UserResponse,
    pub session_token: String,
}

/// The authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    pool: DbPool,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(pool: DbPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Create an account. Does not log the user in.
    ///
    /// Rejects a username or email already used by any account, in either
    /// column, with [`AuthError::DuplicateAccount`] and a password below the
    /// policy floor with [`AuthError::WeakPassword`].
    pub async fn register(&self, input: NewAccount) -> AppResult<DbId> {
        let existing =
            UserRepo::find_identity_conflict(&self.pool, &input.username, &input.email, None)
                .await?;
        if existing.is_some() {
            return Err(AuthError::DuplicateAccount.into());
        }

        validate_password(&input.password)?;

        let (password_hash, salt) = self.hash_new_password(input.password).await?;

        let create = CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            salt,
            first_name: input.first_name,
            last_name: input.last_name,
        };
        let user = UserRepo::create(&self.pool, &create, Utc::now())
            .await
            .map_err(duplicate_on_unique_violation)?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user.id)
    }

    /// Log in with a username or email and a password.
    ///
    /// On success the failure counter is reset, `last_login` is stamped and a
    /// new session is created. Each wrong password is counted; reaching the
    /// configured maximum locks the account for the lockout duration.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<LoginOutcome> {
        let now = Utc::now();

        let mut user = UserRepo::find_by_username_or_email(&self.pool, identifier, identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(until) = user.active_lock(now) {
            tracing::warn!(user_id = user.id, %until, "Login refused: account locked");
            return Err(AuthError::AccountLocked { until }.into());
        }

        if !self.check_password(password, &user.password_hash).await? {
            let lock_until = now + self.config.lockout_duration;
            let state = UserRepo::record_failed_login(
                &self.pool,
                user.id,
                now,
                self.config.max_failed_attempts,
                lock_until,
            )
            .await?;

            match state {
                Some(state) if state.locked_until.is_some() => tracing::warn!(
                    user_id = user.id,
                    failed_attempts = state.failed_attempts,
                    "Account locked after repeated login failures"
                ),
                Some(state) => tracing::warn!(
                    user_id = user.id,
                    failed_attempts = state.failed_attempts,
                    "Login failed: wrong password"
                ),
                None => {}
            }
            return Err(AuthError::InvalidCredentials.into());
        }

        UserRepo::record_successful_login(&self.pool, user.id, now).await?;
        user.failed_attempts = 0;
        user.locked_until = None;
        user.last_login = Some(now);
        user.updated_at = now;

        let session_token = self.create_session(user.id).await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            user: user.into(),
            session_token,
        })
    }

    /// Issue a new session for `user_id` and return its plaintext token.
    pub async fn create_session(&self, user_id: DbId) -> AppResult<String> {
        let now = Utc::now();
        let token = generate_session_token();

        let input = CreateSession {
            user_id,
            session_token_hash: hash_session_token(&token),
            expires_at: now + self.config.session_duration,
        };
        SessionRepo::create(&self.pool, &input, now)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Auth(AuthError::NotFound)
                }
                other => AppError::Database(other),
            })?;

        tracing::debug!(user_id, "Session created");
        Ok(token)
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for unknown, logged-out or expired tokens; absence is a
    /// normal outcome, not an error.
    pub async fn validate_session(&self, token: &str) -> AppResult<Option<UserResponse>> {
        let user =
            SessionRepo::find_active_user(&self.pool, &hash_session_token(token), Utc::now())
                .await?;
        Ok(user.map(UserResponse::from))
    }

    /// Deactivate the session for `token`. Idempotent.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let deactivated = SessionRepo::deactivate(&self.pool, &hash_session_token(token)).await?;
        tracing::debug!(deactivated, "Logout processed");
        Ok(())
    }

    /// Change a password after re-checking the current one.
    ///
    /// The new hash and the deactivation of every session of the user are
    /// committed together, forcing a fresh login everywhere.
    pub async fn change_password(
        &self,
        user_id: DbId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self
            .check_password(current_password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id, "Password change refused: wrong current password");
            return Err(AuthError::InvalidCredentials.into());
        }

        validate_password(new_password)?;

        let (password_hash, salt) = self.hash_new_password(new_password.to_owned()).await?;

        let mut tx = self.pool.begin().await?;
        UserRepo::update_password(&mut *tx, user_id, &password_hash, &salt, Utc::now()).await?;
        let revoked = SessionRepo::deactivate_all_for_user(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(user_id, sessions_revoked = revoked, "Password changed");
        Ok(())
    }

    /// Apply an allow-listed profile update and return the fresh projection.
    ///
    /// A new email already used as another account's username or email is
    /// rejected with [`AuthError::DuplicateAccount`].
    pub async fn update_profile(
        &self,
        user_id: DbId,
        input: &UpdateProfile,
    ) -> AppResult<UserResponse> {
        if let Some(email) = input.email.as_deref() {
            let existing =
                UserRepo::find_identity_conflict(&self.pool, email, email, Some(user_id)).await?;
            if existing.is_some() {
                return Err(AuthError::DuplicateAccount.into());
            }
        }

        let user = UserRepo::update_profile(&self.pool, user_id, input, Utc::now())
            .await
            .map_err(duplicate_on_unique_violation)?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(user_id, "Profile updated");
        Ok(user.into())
    }

    /// Fetch the sanitized projection of a user.
    pub async fn get_user(&self, user_id: DbId) -> AppResult<UserResponse> {
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    /// Hash on the blocking pool; returns `(phc_hash, salt)`.
    async fn hash_new_password(&self, password: String) -> AppResult<(String, String)> {
        let params = self.config.hash;
        tokio::task::spawn_blocking(move || {
            let salt = password::generate_salt();
            password::hash_password(&password, &salt, &params)
                .map(|hash| (hash, salt.as_str().to_owned()))
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
    }

    /// Verify on the blocking pool.
    async fn check_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Verification task failed: {e}")))?
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
    }
}

/// Report a `UNIQUE` violation on `users` as a duplicate account.
fn duplicate_on_unique_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Auth(AuthError::DuplicateAccount)
        }
        other => AppError::Database(other),
    }
}
