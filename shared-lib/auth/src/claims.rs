//! Identity claims carried inside tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use user_store::{Role, UserRecord};

/// The identity a token vouches for.
///
/// Built from a user record at login; never stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Subject (user ID)
    pub sub: String,
    /// User's role
    pub role: Role,
    pub username: String,
    pub email: String,
    pub fullname: String,
    #[serde(default)]
    pub course: String,
}

impl IdentityClaim {
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            sub: user.id.clone(),
            role: user.role,
            username: user.username.clone(),
            email: user.email.clone(),
            fullname: user.fullname.clone(),
            course: user.course.clone(),
        }
    }

    /// Check if the user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims valid for `ttl` from `issued_at`.
    pub fn new(identity: IdentityClaim, issuer: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            identity,
            exp: iat + ttl.num_seconds(),
            iat,
            iss: issuer.into(),
        }
    }

    /// Expiry is exclusive: a token is dead from the `exp` second onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
