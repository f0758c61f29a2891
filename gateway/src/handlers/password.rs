//! Forgot-password flow: request OTP → verify OTP → reset password.

use auth::OtpError;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use error::ErrorResponse;
use serde::Deserialize;

use crate::cookie::{clear_cookie, read_cookie, set_cookie, RESET_COOKIE};
use crate::errors::{otp_status, ApiError};
use crate::guard::LOGIN_PATH;
use crate::state::AppState;
use crate::views::{self, FormView};

const VERIFY_OTP_PATH: &str = "/verify-otp";
const RESET_PASSWORD_PATH: &str = "/reset-password";

#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpForm {
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: String,
}

fn otp_failure(view: &'static str, err: &OtpError) -> FormView {
    FormView::new(view).with_error(ErrorResponse::from(err).message)
}

pub async fn forgot_page() -> Response {
    FormView::new(views::FORGOT_PASSWORD).into_response()
}

pub async fn forgot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ForgotForm>,
) -> Result<Response, ApiError> {
    let email = form.email.trim();

    if let Err(e) = state.otp.request_otp(email).await {
        return Ok(otp_failure(views::FORGOT_PASSWORD, &e).render(otp_status(&e)));
    }

    if let Some(previous) = read_cookie(&headers, RESET_COOKIE) {
        state.workflows.end(&previous).await;
    }
    let session_id = state.workflows.start(email).await;
    let cookie = set_cookie(
        RESET_COOKIE,
        &session_id,
        state.config.reset_session_ttl_secs,
        state.config.cookie_secure,
    )?;

    Ok(([(SET_COOKIE, cookie)], Redirect::to(VERIFY_OTP_PATH)).into_response())
}

pub async fn verify_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut view = FormView::new(views::VERIFY_OTP);
    if let Some(id) = read_cookie(&headers, RESET_COOKIE) {
        if let Some(email) = state.workflows.email(&id).await {
            view = view.with_email(email);
        }
    }
    view.into_response()
}

pub async fn verify(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<OtpForm>) -> Response {
    let session = match read_cookie(&headers, RESET_COOKIE) {
        Some(id) => state.workflows.email(&id).await.map(|email| (id, email)),
        None => None,
    };
    let Some((session_id, email)) = session else {
        let err = OtpError::NoActiveOtp;
        return otp_failure(views::VERIFY_OTP, &err).render(otp_status(&err));
    };

    match state.otp.verify_otp(&email, form.otp.trim()).await {
        Ok(grant) => {
            if !state.workflows.attach_grant(&session_id, grant).await {
                let err = OtpError::NoActiveOtp;
                return otp_failure(views::VERIFY_OTP, &err).render(otp_status(&err));
            }
            Redirect::to(RESET_PASSWORD_PATH).into_response()
        }
        Err(e) => otp_failure(views::VERIFY_OTP, &e)
            .with_email(email)
            .render(otp_status(&e)),
    }
}

pub async fn reset_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match read_cookie(&headers, RESET_COOKIE) {
        Some(id) if state.workflows.has_grant(&id).await => {
            let mut view = FormView::new(views::RESET_PASSWORD);
            if let Some(email) = state.workflows.email(&id).await {
                view = view.with_email(email);
            }
            view.into_response()
        }
        _ => Redirect::to(LOGIN_PATH).into_response(),
    }
}

pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResetForm>,
) -> Result<Response, ApiError> {
    let Some(session_id) = read_cookie(&headers, RESET_COOKIE) else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    if !state.workflows.has_grant(&session_id).await {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    if form.password.is_empty() {
        return Ok(FormView::new(views::RESET_PASSWORD)
            .with_error("Password is required")
            .render(StatusCode::BAD_REQUEST));
    }
    if form.password != form.confirm_password {
        return Ok(FormView::new(views::RESET_PASSWORD)
            .with_error("Passwords do not match")
            .render(StatusCode::BAD_REQUEST));
    }

    let Some(grant) = state.workflows.take_grant(&session_id).await else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let result = state.otp.reset_password(grant, &form.password).await;
    state.workflows.end(&session_id).await;
    let cleared = clear_cookie(RESET_COOKIE)?;

    match result {
        Ok(()) => Ok((
            [(SET_COOKIE, cleared)],
            FormView::new(views::LOGIN).with_success("Password reset successfully. Please log in."),
        )
            .into_response()),
        Err(e) => Ok((
            [(SET_COOKIE, cleared)],
            otp_failure(views::FORGOT_PASSWORD, &e).render(otp_status(&e)),
        )
            .into_response()),
    }
}
