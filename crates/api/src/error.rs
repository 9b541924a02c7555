use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use homedash_core::error::{AuthError, CoreError};
use serde_json::json;

/// Application-level error type for the auth service and HTTP handlers.
///
/// Wraps [`AuthError`] and [`CoreError`] for domain errors and adds
/// store and internal variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A credential-protocol failure (duplicate, weak password, lockout, ...).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A generic domain-level error from `homedash_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error from sqlx, propagated unchanged.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for service and handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl AppError {
    /// HTTP status, machine-readable code and user-facing message.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            // --- AuthError variants ---
            AppError::Auth(auth) => {
                let (status, code) = match auth {
                    AuthError::DuplicateAccount => (StatusCode::CONFLICT, "CONFLICT"),
                    AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, "WEAK_PASSWORD"),
                    AuthError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                    AuthError::AccountLocked { .. } => (StatusCode::LOCKED, "ACCOUNT_LOCKED"),
                    AuthError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                };
                (status, code, auth.to_string())
            }

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
