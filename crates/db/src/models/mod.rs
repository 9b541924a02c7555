//! Entity structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create / update DTOs used by the repositories

pub mod session;
pub mod user;
