//! Administrator pages: dashboard and student management.

use auth::IdentityClaim;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use student_service::{Dashboard, NewStudent, ServiceError, StudentProfile, StudentUpdate, COURSES};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::views::{self, FormView};

const DASHBOARD_PATH: &str = "/admin/dashboard";

#[derive(Debug, Deserialize)]
pub struct CourseFilter {
    pub course: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub admin: IdentityClaim,
    #[serde(flatten)]
    pub dashboard: Dashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<IdentityClaim>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<DashboardView>, ApiError> {
    let mut dashboard = state.students.dashboard().await?;

    let course = filter.course.filter(|c| !c.is_empty());
    if let Some(course) = &course {
        dashboard.students = state.students.students_in_course(course).await?;
        dashboard.total_students = dashboard.students.len();
    }

    Ok(Json(DashboardView {
        admin,
        dashboard,
        course,
    }))
}

pub async fn by_course(
    State(state): State<AppState>,
    Path(course): Path<String>,
) -> Result<Json<Vec<StudentProfile>>, ApiError> {
    Ok(Json(state.students.students_in_course(&course).await?))
}

pub async fn add_student_page() -> FormView {
    FormView::new(views::ADD_STUDENT).with_courses(&COURSES)
}

pub async fn add_student(State(state): State<AppState>, Form(input): Form<NewStudent>) -> Result<Response, ApiError> {
    match state.students.add_student(input).await {
        Ok(_) => Ok(Redirect::to(DASHBOARD_PATH).into_response()),
        Err(e) => {
            if matches!(e, ServiceError::Store(_) | ServiceError::Hashing(_)) {
                return Err(e.into());
            }
            let status = match e {
                ServiceError::UsernameTaken | ServiceError::EmailTaken => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            Ok(FormView::new(views::ADD_STUDENT)
                .with_courses(&COURSES)
                .with_error(e.to_string())
                .render(status))
        }
    }
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentProfile>, ApiError> {
    Ok(Json(state.students.get_student(&id).await?))
}

pub async fn edit_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(update): Form<StudentUpdate>,
) -> Result<Redirect, ApiError> {
    state.students.edit_student(&id, update).await?;
    Ok(Redirect::to(DASHBOARD_PATH))
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, ApiError> {
    state.students.delete_student(&id).await?;
    Ok(Redirect::to(DASHBOARD_PATH))
}
