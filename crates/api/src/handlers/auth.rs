//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use homedash_core::password_policy::{password_strength, PasswordStrength};
use homedash_core::types::DbId;
use homedash_db::models::user::{UpdateProfile, UserResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::service::{LoginOutcome, NewAccount};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Response body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: DbId,
}

/// Request body for `POST /auth/login`. `username` may also be an email.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/logout` and `POST /auth/sessions/validate`.
#[derive(Debug, Deserialize)]
pub struct SessionTokenRequest {
    pub session_token: String,
}

/// Request body for `POST /auth/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for `POST /auth/password/strength`.
#[derive(Debug, Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Returns 201 with the new user id; does not log in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    input.validate()?;

    let user_id = state
        .auth
        .register(NewAccount {
            username: input.username,
            email: input.email,
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse { user_id },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username (or email) and password. Returns the user and a
/// new session token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginOutcome>>> {
    input.validate()?;
    let outcome = state.auth.authenticate(&input.username, &input.password).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/auth/logout
///
/// Deactivate a session. Unknown or already inactive tokens also return 204.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<SessionTokenRequest>,
) -> AppResult<StatusCode> {
    state.auth.logout(&input.session_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/sessions/validate
///
/// Resolve a session token. `data` is `null` when the session is not usable.
pub async fn validate_session(
    State(state): State<AppState>,
    Json(input): Json<SessionTokenRequest>,
) -> AppResult<Json<DataResponse<Option<UserResponse>>>> {
    let user = state.auth.validate_session(&input.session_token).await?;
    Ok(Json(DataResponse { data: user }))
}

/// POST /api/v1/auth/password
///
/// Change the caller's password. Every session of the user, including the one
/// used for this request, is deactivated. Returns 204 No Content.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .auth
        .change_password(auth.user_id, &input.current_password, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/password/strength
///
/// Advisory strength rating. Never rejects a password.
pub async fn check_password_strength(
    Json(input): Json<PasswordStrengthRequest>,
) -> Json<DataResponse<PasswordStrength>> {
    Json(DataResponse {
        data: password_strength(&input.password),
    })
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state.auth.get_user(auth.user_id).await?;
    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/auth/profile
///
/// Update allow-listed profile fields. Unknown fields are rejected by the
/// JSON extractor; `null` clears an optional field.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    let user = state.auth.update_profile(auth.user_id, &input).await?;
    Ok(Json(DataResponse { data: user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_rejects_malformed_email() {
        let input: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": "alice-at-example",
            "password": "Passw0rd1",
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn register_request_rejects_empty_and_long_usernames() {
        for username in [String::new(), "u".repeat(65)] {
            let input = RegisterRequest {
                username,
                email: "alice@example.com".into(),
                password: "Passw0rd1".into(),
                first_name: None,
                last_name: None,
            };
            let errors = input.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("username"));
        }
    }

    #[test]
    fn login_request_requires_identifier() {
        let input = LoginRequest {
            username: String::new(),
            password: "whatever".into(),
        };
        assert!(input.validate().is_err());

        let input = LoginRequest {
            username: "alice@example.com".into(),
            password: "whatever".into(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn register_request_names_are_optional() {
        let input: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "Passw0rd1",
        }))
        .unwrap();
        assert!(input.first_name.is_none());
        assert!(input.validate().is_ok());
    }
}
