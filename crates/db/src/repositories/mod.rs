//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! the pool (or, for transactional steps, any executor) as the first argument.

pub mod session_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
