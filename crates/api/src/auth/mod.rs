//! Authentication: password hashing, session tokens and the auth service.

pub mod password;
pub mod service;
pub mod token;
