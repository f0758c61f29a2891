//! HTTP mapping of application errors.

use auth::{AuthError, OtpError};
use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error::{AppError, ErrorResponse, StoreError};
use student_service::ServiceError;

/// Error returned from JSON handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::AccessDenied => StatusCode::FORBIDDEN,
                AuthError::TokenCreationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Otp(e) => otp_status(e),
            AppError::Store(e) => store_status(e),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Status for an OTP failure rendered on a form.
pub fn otp_status(err: &OtpError) -> StatusCode {
    match err {
        OtpError::UnknownEmail => StatusCode::NOT_FOUND,
        OtpError::NoActiveOtp | OtpError::OtpMismatch | OtpError::OtpExpired => StatusCode::BAD_REQUEST,
        OtpError::NotificationFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        OtpError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        OtpError::Store(e) => store_status(e),
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::DuplicateEntry(_) => StatusCode::CONFLICT,
        StoreError::Io(_) | StoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        Self(err.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err.into())
    }
}

/// Header construction failures are programming errors surfaced as 500s.
impl From<InvalidHeaderValue> for ApiError {
    fn from(err: InvalidHeaderValue) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}
