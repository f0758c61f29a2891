//! HTTP routing
//!
//! Public routes serve login and the password reset flow. Admin and student
//! routes sit behind the access guard: `authenticate` runs first, then the
//! role check.

use auth::{authorize, Role};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::routing::{get, post};
use axum::Router;

use crate::guard;
use crate::handlers::{admin, login, password, student};
use crate::state::AppState;
use crate::views::{self, FormView};

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/courses/:course", get(admin::by_course))
        .route("/admin/add-student", get(admin::add_student_page).post(admin::add_student))
        .route("/admin/students/:id", get(admin::get_student))
        .route("/admin/students/:id/edit", post(admin::edit_student))
        .route("/admin/students/:id/delete", post(admin::delete_student))
        .route_layer(from_fn(|req: Request, next: Next| {
            guard::require_role(authorize(Role::Admin), req, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), guard::authenticate));

    let student_routes = Router::new()
        .route("/student/profile", get(student::profile))
        .route_layer(from_fn(|req: Request, next: Next| {
            guard::require_role(authorize(Role::User), req, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), guard::authenticate));

    Router::new()
        .route("/", get(login::home))
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(login::logout))
        .route("/forgot-password", get(password::forgot_page).post(password::forgot))
        .route("/verify-otp", get(password::verify_page).post(password::verify))
        .route("/reset-password", get(password::reset_page).post(password::reset))
        .merge(admin_routes)
        .merge(student_routes)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> axum::response::Response {
    FormView::new(views::NOT_FOUND).render(StatusCode::NOT_FOUND)
}
