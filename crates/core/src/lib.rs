//! Domain logic for the dashboard authentication subsystem.
//!
//! Everything here is free of database and HTTP dependencies so it can be
//! unit tested in isolation and shared by the `db` and `api` crates.

pub mod error;
pub mod hashing;
pub mod password_policy;
pub mod types;
