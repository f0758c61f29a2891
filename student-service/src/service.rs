//! Student service
//!
//! Business logic for student management.

use std::sync::Arc;

use auth::password::hash_password;
use error::{AppError, StoreError};
use thiserror::Error;
use user_store::{Role, UserRecord, UserRepository};

use crate::models::{is_known_course, Dashboard, NewAdmin, NewStudent, StudentProfile, StudentUpdate, COURSES};

/// Service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Student not found: {0}")]
    NotFound(String),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Absences must be a whole number: {0}")]
    InvalidAbsences(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEntry(field) if field == "username" => Self::UsernameTaken,
            StoreError::DuplicateEntry(field) if field == "email" => Self::EmailTaken,
            other => Self::Store(other),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => AppError::NotFound(format!("Student {}", id)),
            ServiceError::Store(e) => AppError::Store(e),
            ServiceError::Hashing(e) => AppError::Internal(e),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Student service for business operations
pub struct StudentService {
    users: Arc<UserRepository>,
}

impl StudentService {
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    /// All students with the course catalogue.
    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let students: Vec<StudentProfile> = self
            .users
            .all()
            .await?
            .iter()
            .filter(|u| u.role == Role::User)
            .map(StudentProfile::from)
            .collect();

        Ok(Dashboard {
            total_students: students.len(),
            students,
            courses: COURSES.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Students enrolled in `course`, in stored order.
    pub async fn students_in_course(&self, course: &str) -> Result<Vec<StudentProfile>, ServiceError> {
        if !is_known_course(course) {
            return Err(ServiceError::UnknownCourse(course.to_string()));
        }

        Ok(self
            .users
            .all()
            .await?
            .iter()
            .filter(|u| u.role == Role::User && u.course == course)
            .map(StudentProfile::from)
            .collect())
    }

    /// A single student by id. Admin records are not students.
    pub async fn get_student(&self, id: &str) -> Result<StudentProfile, ServiceError> {
        self.find_student(id).await.map(|u| StudentProfile::from(&u))
    }

    /// Profile of the logged-in student, read fresh from the store.
    pub async fn profile(&self, user_id: &str) -> Result<StudentProfile, ServiceError> {
        self.get_student(user_id).await
    }

    pub async fn add_student(&self, input: NewStudent) -> Result<StudentProfile, ServiceError> {
        let fullname = required(&input.fullname, "fullname")?;
        let username = required(&input.username, "username")?;
        let email = required(&input.email, "email")?;
        let course = required(&input.course, "course")?;
        if input.password.is_empty() {
            return Err(ServiceError::MissingField("password"));
        }
        validate_email(&email)?;
        if !is_known_course(&course) {
            return Err(ServiceError::UnknownCourse(course));
        }

        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            fullname,
            username,
            email,
            password: hash(&input.password)?,
            course,
            role: Role::User,
            absences: 0,
            tests: Vec::new(),
        };

        let created = self.users.insert(record).await?;
        tracing::info!("Added student {} ({})", created.username, created.id);
        Ok(StudentProfile::from(&created))
    }

    pub async fn edit_student(&self, id: &str, update: StudentUpdate) -> Result<StudentProfile, ServiceError> {
        let update = update.normalized();
        self.find_student(id).await?;

        if let Some(course) = &update.course {
            if !is_known_course(course) {
                return Err(ServiceError::UnknownCourse(course.clone()));
            }
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        let absences = match &update.absences {
            Some(v) => Some(v.parse::<u32>().map_err(|_| ServiceError::InvalidAbsences(v.clone()))?),
            None => None,
        };
        let password = match &update.password {
            Some(p) => Some(hash(p)?),
            None => None,
        };

        let updated = self
            .users
            .update(id, move |u| {
                if let Some(v) = update.fullname {
                    u.fullname = v;
                }
                if let Some(v) = update.username {
                    u.username = v;
                }
                if let Some(v) = update.email {
                    u.email = v;
                }
                if let Some(v) = update.course {
                    u.course = v;
                }
                if let Some(v) = absences {
                    u.absences = v;
                }
                if let Some(v) = password {
                    u.password = v;
                }
            })
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::NotFound(id.to_string()),
                other => other.into(),
            })?;

        tracing::info!("Updated student {}", updated.id);
        Ok(StudentProfile::from(&updated))
    }

    pub async fn delete_student(&self, id: &str) -> Result<StudentProfile, ServiceError> {
        self.find_student(id).await?;
        let removed = self.users.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => ServiceError::NotFound(id.to_string()),
            other => other.into(),
        })?;

        tracing::info!("Deleted student {} ({})", removed.username, removed.id);
        Ok(StudentProfile::from(&removed))
    }

    /// Create an administrator unless one already exists.
    /// Returns whether a record was created.
    pub async fn ensure_admin(&self, input: NewAdmin) -> Result<bool, ServiceError> {
        if self.users.all().await?.iter().any(|u| u.is_admin()) {
            return Ok(false);
        }

        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            fullname: required(&input.fullname, "fullname")?,
            username: required(&input.username, "username")?,
            email: required(&input.email, "email")?,
            password: hash(&input.password)?,
            course: String::new(),
            role: Role::Admin,
            absences: 0,
            tests: Vec::new(),
        };

        let created = self.users.insert(record).await?;
        tracing::info!("Bootstrapped administrator {}", created.username);
        Ok(true)
    }

    async fn find_student(&self, id: &str) -> Result<UserRecord, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|u| u.role == Role::User)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::MissingField(field));
    }
    Ok(value.to_string())
}

fn validate_email(email: &str) -> Result<(), ServiceError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ServiceError::InvalidEmail),
    }
}

fn hash(password: &str) -> Result<String, ServiceError> {
    hash_password(password).map_err(|e| ServiceError::Hashing(e.to_string()))
}
