use auth::IdentityClaim;
use axum::extract::State;
use axum::{Extension, Json};
use student_service::StudentProfile;

use crate::errors::ApiError;
use crate::state::AppState;

/// The logged-in student's own record.
pub async fn profile(
    State(state): State<AppState>,
    Extension(claim): Extension<IdentityClaim>,
) -> Result<Json<StudentProfile>, ApiError> {
    Ok(Json(state.students.profile(&claim.sub).await?))
}
