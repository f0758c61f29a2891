//! Token issuance and verification (HS256 JWT).

use std::sync::Arc;

use chrono::Duration;
use error::AuthError;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use sha2::Sha256;

use crate::claims::{Claims, IdentityClaim};
use crate::clock::{Clock, SystemClock};

type HmacSha256 = Hmac<Sha256>;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token issuer
    pub issuer: String,
    /// Token validity duration in seconds
    pub expires_in_secs: i64,
}

impl JwtConfig {
    /// Create a new JWT configuration.
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expires_in_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expires_in_secs,
        }
    }
}

/// Issues and verifies stateless bearer tokens (HS256).
///
/// Signature comparison goes through `Mac::verify_slice`, which is
/// constant-time.
pub struct TokenService {
    key: HmacSha256,
    issuer: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &JwtConfig, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            tracing::error!("Refusing to sign tokens with an empty secret");
            return Err(AuthError::TokenCreationFailed);
        }

        let key = HmacSha256::new_from_slice(config.secret.as_bytes()).map_err(|e| {
            tracing::error!("Failed to create HMAC key: {}", e);
            AuthError::TokenCreationFailed
        })?;

        Ok(Self {
            key,
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(config.expires_in_secs),
            clock,
        })
    }

    /// Token lifetime from issuance.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `identity` into a token expiring `ttl` from now.
    pub fn issue(&self, identity: &IdentityClaim) -> Result<String, AuthError> {
        let claims = Claims::new(identity.clone(), self.issuer.clone(), self.clock.now(), self.ttl);

        claims.sign_with_key(&self.key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            AuthError::TokenCreationFailed
        })
    }

    /// Decode and validate a token.
    ///
    /// Bad signature, malformed input, foreign issuer and expiry all yield
    /// `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        let claims: Claims = token.verify_with_key(&self.key).map_err(|e| {
            tracing::warn!("Failed to decode JWT: {}", e);
            AuthError::InvalidToken
        })?;

        // Validate issuer
        if claims.iss != self.issuer {
            tracing::warn!("Invalid issuer: expected {}, got {}", self.issuer, claims.iss);
            return Err(AuthError::InvalidToken);
        }

        if claims.is_expired_at(self.clock.now()) {
            tracing::debug!("Token for {} expired at {}", claims.identity.sub, claims.exp);
            return Err(AuthError::InvalidToken);
        }

        Ok(claims.identity)
    }
}
