//! One-time passcodes for password reset.
//!
//! Flow: `request_otp` → `verify_otp` (yields a [`ResetGrant`]) →
//! `reset_password` (consumes it). Each step is a separate call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use error::OtpError;
use rand::Rng;
use tokio::sync::RwLock;
use user_store::{Role, StoreError, UserRepository};

use crate::clock::{Clock, SystemClock};
use crate::notify::Notifier;
use crate::password::hash_password;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;
const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// A live passcode for one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Role of the account the code was issued for
    pub role: Role,
}

impl OtpRecord {
    /// Valid strictly before `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Storage for OTP records keyed by email.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert or replace the record for `email`.
    async fn put(&self, email: &str, record: OtpRecord);

    async fn get(&self, email: &str) -> Option<OtpRecord>;

    /// Remove the record for `email` only if it still holds `code`.
    /// Check and removal are one atomic step.
    async fn delete_if(&self, email: &str, code: &str) -> Option<OtpRecord>;
}

/// Process-local OTP storage.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, email: &str, record: OtpRecord) {
        self.records.write().await.insert(email.to_string(), record);
    }

    async fn get(&self, email: &str) -> Option<OtpRecord> {
        self.records.read().await.get(email).cloned()
    }

    async fn delete_if(&self, email: &str, code: &str) -> Option<OtpRecord> {
        let mut records = self.records.write().await;
        match records.get(email) {
            Some(current) if current.code == code => records.remove(email),
            _ => None,
        }
    }
}

/// Proof that an OTP for `email` was just verified.
///
/// Only [`OtpManager::verify_otp`] creates one and
/// [`OtpManager::reset_password`] consumes it.
#[derive(Debug)]
pub struct ResetGrant {
    email: String,
    role: Role,
}

impl ResetGrant {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Random 6-digit code, uniform over `[100000, 999999]`.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

pub struct OtpManager {
    users: Arc<UserRepository>,
    store: Arc<dyn OtpStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl OtpManager {
    pub fn new(users: Arc<UserRepository>, store: Arc<dyn OtpStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            users,
            store,
            notifier,
            clock: Arc::new(SystemClock),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issue a fresh code for `email` and mail it.
    ///
    /// Replaces any unconsumed code for the same email. If delivery fails the
    /// new record is withdrawn again, unless a newer request already replaced it.
    pub async fn request_otp(&self, email: &str) -> Result<(), OtpError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(OtpError::UnknownEmail)?;

        let code = generate_code();
        let record = OtpRecord {
            code: code.clone(),
            expires_at: self.clock.now() + self.ttl,
            role: user.role,
        };
        self.store.put(email, record).await;

        let body = format!("Your OTP code is: {}", code);
        if let Err(e) = self.notifier.send(email, "Password Reset OTP", &body).await {
            tracing::error!("Failed to deliver OTP to {}: {}", email, e);
            self.store.delete_if(email, &code).await;
            return Err(OtpError::NotificationFailed(e.to_string()));
        }

        tracing::info!("OTP issued for {}", email);
        Ok(())
    }

    /// Check a submitted code. Success consumes the record.
    pub async fn verify_otp(&self, email: &str, submitted: &str) -> Result<ResetGrant, OtpError> {
        let record = self.store.get(email).await.ok_or(OtpError::NoActiveOtp)?;

        let expired = record.is_expired_at(self.clock.now());

        if record.code != submitted {
            tracing::warn!("OTP mismatch for {}", email);
            if expired {
                self.store.delete_if(email, &record.code).await;
            }
            return Err(OtpError::OtpMismatch);
        }

        if expired {
            tracing::warn!("Expired OTP submitted for {}", email);
            self.store.delete_if(email, &record.code).await;
            return Err(OtpError::OtpExpired);
        }

        // Only the caller that removes this exact record gets the grant.
        if self.store.delete_if(email, &record.code).await.is_none() {
            return Err(OtpError::NoActiveOtp);
        }
        tracing::info!("OTP verified for {}", email);

        Ok(ResetGrant {
            email: email.to_string(),
            role: record.role,
        })
    }

    /// Store a new password for the account named by `grant`.
    pub async fn reset_password(&self, grant: ResetGrant, new_password: &str) -> Result<(), OtpError> {
        let digest = hash_password(new_password).map_err(|e| OtpError::Hashing(e.to_string()))?;

        self.users
            .update_password(&grant.email, digest)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => OtpError::UnknownEmail,
                other => OtpError::Store(other),
            })?;

        tracing::info!("Password reset for {}", grant.email);
        Ok(())
    }
}
