use crate::types::Timestamp;

/// Failures of the authentication protocol itself.
///
/// Every variant is a normal, per-call outcome that the boundary layer turns
/// into a message for the end user. Store failures are never folded in here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A user already holds the requested username or email.
    #[error("A user with this username or email already exists")]
    DuplicateAccount,

    /// The password does not meet the server-side policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Unknown identifier or wrong password. The text is constant so callers
    /// cannot tell which half was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Too many consecutive failures; authentication is refused until `until`.
    #[error("Account is locked until {}", .until.format("%Y-%m-%d %H:%M:%S UTC"))]
    AccountLocked { until: Timestamp },

    /// The referenced user does not exist.
    #[error("User not found")]
    NotFound,
}

/// Generic domain errors used outside the credential protocol.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
