//! Account Error Types
//!
//! This module provides account-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, validation::ValidationErrors};
use thiserror::Error;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

/// Account-specific error variants
#[derive(Debug, Error)]
pub enum AccountError {
    /// One or more form fields failed their rules
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The only failure is an email address held by another user
    #[error("{0}")]
    EmailTaken(ValidationErrors),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Invalid verification link")]
    InvalidVerificationLink,

    #[error("Verification link has expired")]
    VerificationLinkExpired,

    /// Malformed request body
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload exceeds the allowed size")]
    PayloadTooLarge,

    /// Photo could not be written or removed
    #[error("Photo storage error: {0}")]
    PhotoStorage(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) | AccountError::EmailTaken(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AccountError::InvalidVerificationLink => StatusCode::FORBIDDEN,
            AccountError::VerificationLinkExpired => StatusCode::GONE,
            AccountError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AccountError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AccountError::PhotoStorage(_)
            | AccountError::Database(_)
            | AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Validation(_) | AccountError::EmailTaken(_) => {
                ErrorKind::UnprocessableEntity
            }
            AccountError::UserNotFound => ErrorKind::NotFound,
            AccountError::SessionInvalid => ErrorKind::Unauthorized,
            AccountError::InvalidVerificationLink => ErrorKind::Forbidden,
            AccountError::VerificationLinkExpired => ErrorKind::Gone,
            AccountError::BadRequest(_) => ErrorKind::BadRequest,
            AccountError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            AccountError::PhotoStorage(_)
            | AccountError::Database(_)
            | AccountError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Field errors carried by validation failures
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AccountError::Validation(errors) | AccountError::EmailTaken(errors) => Some(errors),
            _ => None,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay in the log; the client gets a generic message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccountError::Validation(errors) | AccountError::EmailTaken(errors) => {
                AppError::validation(errors.clone())
            }
            AccountError::VerificationLinkExpired => {
                AppError::gone(self.to_string()).with_action("Request a new verification email")
            }
            AccountError::SessionInvalid => {
                AppError::unauthorized(self.to_string()).with_action("Sign in again")
            }
            AccountError::InvalidVerificationLink => AppError::forbidden(self.to_string()),
            AccountError::PhotoStorage(_)
            | AccountError::Database(_)
            | AccountError::Internal(_) => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::PhotoStorage(msg) => {
                tracing::error!(message = %msg, "Profile photo storage error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::InvalidVerificationLink => {
                tracing::warn!("Rejected verification link");
            }
            AccountError::Validation(errors) | AccountError::EmailTaken(errors) => {
                tracing::debug!(bag = errors.bag(), fields = errors.len(), "Validation failed");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AccountError {
    fn from(err: AppError) -> Self {
        AccountError::Internal(err.to_string())
    }
}
