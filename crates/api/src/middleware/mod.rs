//! Request authentication extractors.
//!
//! - [`auth::AuthUser`] -- Resolves a session bearer token to its user.

pub mod auth;
