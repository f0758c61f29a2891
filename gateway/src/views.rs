//! Form views.
//!
//! Pages are returned as JSON documents naming the view and carrying the
//! message to show on it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const LOGIN: &str = "login";
pub const FORGOT_PASSWORD: &str = "auth/forgot-password";
pub const VERIFY_OTP: &str = "auth/verify-otp";
pub const RESET_PASSWORD: &str = "auth/reset-password";
pub const ADD_STUDENT: &str = "admin/add-student";
pub const NOT_FOUND: &str = "404";

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<&'static str>>,
}

impl FormView {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            error: None,
            success: None,
            email: None,
            courses: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_success(mut self, success: impl Into<String>) -> Self {
        self.success = Some(success.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_courses(mut self, courses: &[&'static str]) -> Self {
        self.courses = Some(courses.to_vec());
        self
    }

    pub fn render(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for FormView {
    fn into_response(self) -> Response {
        self.render(StatusCode::OK)
    }
}
