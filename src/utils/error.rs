//! Error types for the access-control service

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the service
pub type Result<T> = std::result::Result<T, GateError>;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input, surfaced with field-level detail
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Registration with an email that is already taken
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Login failure; deliberately identical for unknown email and wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Request requires authentication it did not carry
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bearer token is malformed, badly signed, or expired (collapsed on purpose)
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Authenticated but not permitted
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Reset token unknown, expired, or already consumed (collapsed on purpose)
    #[error("Invalid or expired reset token")]
    ResetTokenInvalidOrExpired,

    /// No identity matches the given lookup
    #[error("User not found")]
    UserNotFound,

    /// Role reference data missing; a server fault, not a caller error
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Persistence layer faults
    #[error("Storage error: {0}")]
    Storage(String),

    /// Hashing/signing library faults, wrapped and never leaked raw
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl ResponseError for GateError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            GateError::Validation(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            GateError::EmailAlreadyExists => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "EMAIL_EXISTS",
                self.to_string(),
            ),
            GateError::InvalidCredentials => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            GateError::Unauthorized(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            GateError::TokenInvalid => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                self.to_string(),
            ),
            GateError::AccessDenied(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                "ACCESS_DENIED",
                self.to_string(),
            ),
            GateError::ResetTokenInvalidOrExpired => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "RESET_TOKEN_INVALID",
                self.to_string(),
            ),
            GateError::UserNotFound => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            // Server faults are surfaced generically; detail goes to the log only.
            GateError::Config(_)
            | GateError::RoleNotFound(_)
            | GateError::Storage(_)
            | GateError::Crypto(_)
            | GateError::Internal(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        if status_code.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
