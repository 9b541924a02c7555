pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                register (public)
/// /auth/login                   login (public)
/// /auth/logout                  logout (public)
/// /auth/sessions/validate       resolve a session token (public)
/// /auth/password                change password (requires auth)
/// /auth/password/strength       advisory strength meter (public)
/// /auth/me                      current user (requires auth)
/// /auth/profile                 update profile (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}
