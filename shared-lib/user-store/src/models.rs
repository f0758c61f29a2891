//! User record model.

use serde::{Deserialize, Serialize};

/// User roles in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator managing student records
    Admin,
    /// Student
    User,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted user. Field order matches the on-disk layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub fullname: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub absences: u32,
    #[serde(default)]
    pub tests: Vec<serde_json::Value>,
}

impl UserRecord {
    /// True when `login` is either the username or the email of this user.
    pub fn matches_login(&self, login: &str) -> bool {
        self.username == login || self.email == login
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
