//! Authentication, authorization and password reset for the student portal.
//!
//! - [`TokenService`] issues and verifies signed, time-limited identity tokens.
//! - [`guard`] turns a cookie value into an authentication outcome and checks roles.
//! - [`OtpManager`] runs the emailed one-time passcode reset flow.

mod claims;
mod clock;
pub mod guard;
mod token;
mod notify;
mod otp;
pub mod password;

pub use claims::{Claims, IdentityClaim};
pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{authenticate, authorize, Authentication, RoleGuard};
pub use token::{JwtConfig, TokenService};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use otp::{generate_code, InMemoryOtpStore, OtpManager, OtpRecord, OtpStore, ResetGrant};
pub use user_store::Role;

pub use error::{AuthError, OtpError};
