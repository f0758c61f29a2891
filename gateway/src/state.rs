//! Shared application state.

use std::sync::Arc;

use auth::{AuthError, Clock, InMemoryOtpStore, Notifier, OtpManager, SystemClock, TokenService};
use chrono::Duration;
use student_service::StudentService;
use user_store::{UserRepository, UserStore};

use crate::config::GatewayConfig;
use crate::session::WorkflowSessions;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserRepository>,
    pub students: Arc<StudentService>,
    pub otp: Arc<OtpManager>,
    pub workflows: Arc<WorkflowSessions>,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AuthError> {
        Self::with_clock(config, store, notifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: GatewayConfig,
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenService::with_clock(&config.jwt(), clock.clone())?;
        let users = Arc::new(UserRepository::new(store));
        let students = StudentService::new(users.clone());
        let otp = OtpManager::new(users.clone(), Arc::new(InMemoryOtpStore::new()), notifier)
            .with_clock(clock.clone())
            .with_ttl(Duration::seconds(config.otp_ttl_secs));
        let workflows = WorkflowSessions::new(Duration::seconds(config.reset_session_ttl_secs), clock);

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users,
            students: Arc::new(students),
            otp: Arc::new(otp),
            workflows: Arc::new(workflows),
        })
    }
}
