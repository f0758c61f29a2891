//! Password reset workflow sessions.
//!
//! The three reset steps are separate requests. Between them the browser
//! carries a random session id; the server keeps which email the OTP was sent
//! to and, once verified, the [`ResetGrant`]. Entries live in memory only and
//! expire on their own.

use std::collections::HashMap;
use std::sync::Arc;

use auth::{Clock, ResetGrant};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Debug)]
struct ResetWorkflow {
    email: String,
    grant: Option<ResetGrant>,
    expires_at: DateTime<Utc>,
}

pub struct WorkflowSessions {
    sessions: RwLock<HashMap<String, ResetWorkflow>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl WorkflowSessions {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Open a session for `email` and return its id.
    pub async fn start(&self, email: &str) -> String {
        let now = self.clock.now();
        let id = new_session_id();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            id.clone(),
            ResetWorkflow {
                email: email.to_string(),
                grant: None,
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Email the live session `id` was opened for.
    pub async fn email(&self, id: &str) -> Option<String> {
        let now = self.clock.now();
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|s| s.expires_at > now)
            .map(|s| s.email.clone())
    }

    /// Record a verified OTP. Returns false when the session is gone.
    pub async fn attach_grant(&self, id: &str, grant: ResetGrant) -> bool {
        let now = self.clock.now();
        match self.sessions.write().await.get_mut(id) {
            Some(session) if session.expires_at > now && session.email == grant.email() => {
                session.grant = Some(grant);
                true
            }
            _ => false,
        }
    }

    pub async fn has_grant(&self, id: &str) -> bool {
        let now = self.clock.now();
        self.sessions
            .read()
            .await
            .get(id)
            .map(|s| s.expires_at > now && s.grant.is_some())
            .unwrap_or(false)
    }

    /// Remove and return the grant; the session stays open.
    pub async fn take_grant(&self, id: &str) -> Option<ResetGrant> {
        let now = self.clock.now();
        self.sessions
            .write()
            .await
            .get_mut(id)
            .filter(|s| s.expires_at > now)
            .and_then(|s| s.grant.take())
    }

    pub async fn end(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn new_session_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
