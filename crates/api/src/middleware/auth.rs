//! Session-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use homedash_core::error::CoreError;
use homedash_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from `Authorization: Bearer <session token>`.
///
/// Use this as an extractor parameter in any handler that requires a session:
///
/// ```ignore
/// async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<...>> {
///     let user = state.auth.get_user(auth.user_id).await?;
///     Ok(Json(DataResponse { data: user }))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user = state.auth.validate_session(token).await?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired session".into(),
            ))
        })?;

        Ok(AuthUser { user_id: user.id })
    }
}

/// Extract the raw token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}
