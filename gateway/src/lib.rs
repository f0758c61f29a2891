//! Student portal gateway
//!
//! HTTP front end for the portal. Exposed as a library so the router can be
//! driven in-process from tests.

pub mod config;
pub mod cookie;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod mail;
pub mod router;
pub mod session;
pub mod state;
pub mod views;

pub use config::{ConfigError, GatewayConfig, MailConfig};
pub use mail::HttpMailNotifier;
pub use router::build_router;
pub use session::WorkflowSessions;
pub use state::AppState;
