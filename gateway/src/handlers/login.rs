//! Login, logout and landing redirects.

use auth::password::verify_password;
use auth::{Authentication, IdentityClaim, Role};
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::cookie::{clear_cookie, read_cookie, set_cookie, TOKEN_COOKIE};
use crate::errors::ApiError;
use crate::guard::{reject_token, LOGIN_PATH};
use crate::state::AppState;
use crate::views::{self, FormView};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Where each role lands after login.
pub fn landing(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/dashboard",
        Role::User => "/student/profile",
    }
}

pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match auth::authenticate(&state.tokens, read_cookie(&headers, TOKEN_COOKIE).as_deref()) {
        Authentication::Authenticated(claim) => Redirect::to(landing(claim.role)).into_response(),
        Authentication::Rejected => reject_token(),
        Authentication::Anonymous => Redirect::to(LOGIN_PATH).into_response(),
    }
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match auth::authenticate(&state.tokens, read_cookie(&headers, TOKEN_COOKIE).as_deref()) {
        Authentication::Authenticated(claim) => Redirect::to(landing(claim.role)).into_response(),
        _ => FormView::new(views::LOGIN).into_response(),
    }
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response, ApiError> {
    let login = form.username.trim();

    let user = match state.users.find_by_login(login).await? {
        Some(user) if verify_password(&form.password, &user.password) => user,
        _ => {
            tracing::warn!("Failed login for {}", login);
            return Ok(FormView::new(views::LOGIN)
                .with_error("Invalid credentials")
                .render(StatusCode::UNAUTHORIZED));
        }
    };

    let token = state.tokens.issue(&IdentityClaim::from_user(&user))?;
    let cookie = set_cookie(
        TOKEN_COOKIE,
        &token,
        state.tokens.ttl().num_seconds(),
        state.config.cookie_secure,
    )?;

    tracing::info!("{} {} logged in", user.role, user.username);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(landing(user.role))).into_response())
}

/// Drops the cookie only. The token itself stays valid until it expires.
pub async fn logout() -> Result<Response, ApiError> {
    let cleared = clear_cookie(TOKEN_COOKIE)?;
    Ok(([(SET_COOKIE, cleared)], Redirect::to(LOGIN_PATH)).into_response())
}
