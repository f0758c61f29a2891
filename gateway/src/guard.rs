//! Access guard middleware.
//!
//! `authenticate` runs first on every protected route and either redirects to
//! `/login` or attaches the caller's [`IdentityClaim`] to the request.
//! `require_role` then answers 403 for the wrong role.

use auth::{Authentication, IdentityClaim, RoleGuard};
use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::cookie::{clear_cookie, read_cookie, TOKEN_COOKIE};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = read_cookie(req.headers(), TOKEN_COOKIE);

    match auth::authenticate(&state.tokens, token.as_deref()) {
        Authentication::Anonymous => Redirect::to(LOGIN_PATH).into_response(),
        Authentication::Rejected => {
            tracing::warn!("Rejected token on {}", req.uri().path());
            reject_token()
        }
        Authentication::Authenticated(claim) => {
            req.extensions_mut().insert(claim);
            next.run(req).await
        }
    }
}

pub async fn require_role(guard: RoleGuard, req: Request, next: Next) -> Response {
    match guard.check(req.extensions().get::<IdentityClaim>()) {
        Ok(()) => next.run(req).await,
        Err(_) => (StatusCode::FORBIDDEN, "Access Denied").into_response(),
    }
}

/// Redirect to login, dropping the dead token cookie.
pub fn reject_token() -> Response {
    match clear_cookie(TOKEN_COOKIE) {
        Ok(cleared) => ([(SET_COOKIE, cleared)], Redirect::to(LOGIN_PATH)).into_response(),
        Err(e) => {
            tracing::error!("Failed to build cookie header: {}", e);
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}
