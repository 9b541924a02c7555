//! Route definitions for the `/auth` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST  /register            -> register
/// POST  /login               -> login
/// POST  /logout              -> logout
/// POST  /sessions/validate   -> validate_session
/// POST  /password            -> change_password (requires auth)
/// POST  /password/strength   -> check_password_strength
/// GET   /me                  -> me (requires auth)
/// PATCH /profile             -> update_profile (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/sessions/validate", post(auth::validate_session))
        .route("/password", post(auth::change_password))
        .route("/password/strength", post(auth::check_password_strength))
        .route("/me", get(auth::me))
        .route("/profile", patch(auth::update_profile))
}
