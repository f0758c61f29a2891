//! Student models
//!
//! Views and inputs for student management. Stored data lives in
//! [`user_store::UserRecord`]; nothing here carries a password hash out.

use serde::{Deserialize, Serialize};
use user_store::{Role, UserRecord};

/// Courses a student can enrol in.
pub const COURSES: [&str; 4] = [
    "Web Development",
    "Graphic Design",
    "App Development",
    "Data Science",
];

pub fn is_known_course(course: &str) -> bool {
    COURSES.contains(&course)
}

/// A student as shown to admins and to the student themself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: String,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub course: String,
    pub role: Role,
    pub absences: u32,
    pub tests: Vec<serde_json::Value>,
}

impl From<&UserRecord> for StudentProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            fullname: user.fullname.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            course: user.course.clone(),
            role: user.role,
            absences: user.absences,
            tests: user.tests.clone(),
        }
    }
}

/// Admin dashboard contents
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub students: Vec<StudentProfile>,
    pub courses: Vec<String>,
    pub total_students: usize,
}

/// Input for adding a student
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub course: String,
}

/// Input for bootstrapping an administrator
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update of a student. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentUpdate {
    pub fullname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    /// Raw form value, parsed by the service
    pub absences: Option<String>,
    pub password: Option<String>,
}

impl StudentUpdate {
    /// Treat blank form fields as absent.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        Self {
            fullname: keep(self.fullname),
            username: keep(self.username),
            email: keep(self.email),
            course: keep(self.course),
            absences: keep(self.absences),
            password: self.password.filter(|p| !p.is_empty()),
        }
    }
}
