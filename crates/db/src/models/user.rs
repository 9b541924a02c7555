//! User entity model and DTOs.

use homedash_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash and salt -- NEVER serialize this to responses.
/// Use [`UserResponse`] for anything that leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub failed_attempts: i64,
    pub locked_until: Option<Timestamp>,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The lock expiry if a lock is still in force at `now`.
    ///
    /// A `locked_until` at or before `now` has lapsed and is ignored.
    pub fn active_lock(&self, now: Timestamp) -> Option<Timestamp> {
        self.locked_until.filter(|until| *until > now)
    }
}

/// Sanitized user projection (no hash, salt, or security counters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            job_title: user.job_title,
            department: user.department,
            location: user.location,
            bio: user.bio,
            avatar_url: user.avatar_url,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// DTO for inserting a new user. The hash and salt are computed by the caller.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Allow-listed profile attributes a user may change about themselves.
///
/// Security columns (hash, salt, failed attempts, lock, last login) are not
/// representable here. An absent field leaves the column unchanged. The
/// optional attributes use `Option<Option<_>>`: an explicit JSON `null`
/// clears the column. `email` is required on the row and cannot be cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfile {
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub last_name: Option<Option<String>>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 32))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 2000))]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 2048))]
    pub avatar_url: Option<Option<String>>,
}

/// Deserialize a present field (including `null`) as `Some(_)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Security state after a failed login has been recorded.
#[derive(Debug, Clone, FromRow)]
pub struct FailedLogin {
    pub failed_attempts: i64,
    pub locked_until: Option<Timestamp>,
}
