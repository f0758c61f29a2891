//! Access guard logic, independent of the HTTP framework.
//!
//! Per request: `Unauthenticated -> Authenticated(claim) -> Authorized`.
//! Failing the first step is a redirect concern; failing the second is an
//! explicit denial. The two never mix.

use error::AuthError;
use user_store::Role;

use crate::claims::IdentityClaim;
use crate::token::TokenService;

/// Outcome of inspecting a request's credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No credential was presented.
    Anonymous,
    /// A credential was presented but did not verify; the carrier should be cleared.
    Rejected,
    Authenticated(IdentityClaim),
}

/// Verify the token carried by a request, if any.
pub fn authenticate(tokens: &TokenService, token: Option<&str>) -> Authentication {
    match token {
        None => Authentication::Anonymous,
        Some(t) if t.is_empty() => Authentication::Anonymous,
        Some(t) => match tokens.verify(t) {
            Ok(claim) => Authentication::Authenticated(claim),
            Err(_) => Authentication::Rejected,
        },
    }
}

/// Role check produced by [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGuard {
    required: Role,
}

/// Build a guard admitting only identities with exactly `required` role.
pub fn authorize(required: Role) -> RoleGuard {
    RoleGuard { required }
}

impl RoleGuard {
    pub fn required(&self) -> Role {
        self.required
    }

    pub fn check(&self, claim: Option<&IdentityClaim>) -> Result<(), AuthError> {
        match claim {
            Some(c) if c.role == self.required => Ok(()),
            Some(c) => {
                tracing::warn!(
                    "Access denied for {} ({}): requires {}",
                    c.username,
                    c.role,
                    self.required
                );
                Err(AuthError::AccessDenied)
            }
            None => Err(AuthError::AccessDenied),
        }
    }
}
