//! Common error types for the student portal.
//!
//! This crate provides unified error handling across all crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Password reset error: {0}")]
    Otp(#[from] OtpError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication and authorization errors.
///
/// Missing, malformed, expired and badly signed tokens all collapse into
/// `InvalidToken`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token creation failed")]
    TokenCreationFailed,

    #[error("Access denied")]
    AccessDenied,
}

/// One-time passcode and password reset errors.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("No account found with this email")]
    UnknownEmail,

    #[error("No active OTP for this email")]
    NoActiveOtp,

    #[error("OTP does not match")]
    OtpMismatch,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("Failed to send OTP: {0}")]
    NotificationFailed(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// User store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
}

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        let (code, message) = match err {
            AuthError::InvalidCredentials => ("AUTH_INVALID_CREDENTIALS", "Invalid credentials"),
            AuthError::InvalidToken => ("AUTH_INVALID_TOKEN", "Invalid token"),
            AuthError::TokenCreationFailed => ("AUTH_TOKEN_CREATION_FAILED", "Failed to create token"),
            AuthError::AccessDenied => ("AUTH_ACCESS_DENIED", "Access Denied"),
        };
        Self::new(code, message)
    }
}

impl From<&OtpError> for ErrorResponse {
    fn from(err: &OtpError) -> Self {
        let (code, message) = match err {
            OtpError::UnknownEmail => ("OTP_UNKNOWN_EMAIL", "No account found with this email."),
            OtpError::NoActiveOtp => ("OTP_NONE_ACTIVE", "No active OTP. Request a new code."),
            OtpError::OtpMismatch => ("OTP_MISMATCH", "Incorrect OTP."),
            OtpError::OtpExpired => ("OTP_EXPIRED", "OTP has expired. Request a new code."),
            OtpError::NotificationFailed(_) => ("OTP_NOTIFICATION_FAILED", "Failed to send OTP. Try again."),
            OtpError::Hashing(_) => ("OTP_HASHING_FAILED", "Failed to update password."),
            OtpError::Store(e) => return Self::from(e),
        };
        Self::new(code, message)
    }
}

impl From<&StoreError> for ErrorResponse {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::Io(_) => Self::new("STORE_IO", "User store unavailable"),
            StoreError::Serialization(_) => Self::new("STORE_CORRUPT", "User store unreadable"),
            StoreError::NotFound => Self::new("STORE_NOT_FOUND", "Record not found"),
            StoreError::DuplicateEntry(field) => {
                Self::new("STORE_DUPLICATE_ENTRY", "Duplicate entry").with_details(field.clone())
            }
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Auth(e) => Self::from(e),
            AppError::Otp(e) => Self::from(e),
            AppError::Store(e) => Self::from(e),
            AppError::Validation(msg) => Self::new("VALIDATION", msg.clone()),
            AppError::NotFound(what) => Self::new("NOT_FOUND", format!("{} not found", what)),
            AppError::Internal(_) => Self::new("INTERNAL", "Internal error"),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
