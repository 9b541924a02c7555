//! Request handlers.
//!
//! Handlers delegate to [`crate::auth::service::AuthService`] through
//! [`crate::state::AppState`] and map errors via [`crate::error::AppError`].

pub mod auth;
