use std::path::PathBuf;

use auth::JwtConfig;
use student_service::NewAdmin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidTtl { key: &'static str, value: String },
}

/// Transactional mail API settings
#[derive(Clone)]
pub struct MailConfig {
    /// Endpoint receiving `{from, to, subject, text}` as JSON
    pub api_url: String,
    /// Bearer token for the endpoint
    pub api_key: String,
    pub from: String,
}

/// Gateway configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// HTTP listen address
    pub http_addr: String,

    /// Path of the users JSON file
    pub users_path: PathBuf,

    /// Token signing secret
    pub jwt_secret: String,

    pub jwt_issuer: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: i64,

    /// OTP lifetime in seconds
    pub otp_ttl_secs: i64,

    /// Lifetime of a password reset workflow session in seconds
    pub reset_session_ttl_secs: i64,

    /// Add `Secure` to cookies (serve over HTTPS only)
    pub cookie_secure: bool,

    /// Mail API; OTPs are only logged when absent
    pub mail: Option<MailConfig>,

    /// Administrator created at startup when none exists
    pub bootstrap_admin: Option<NewAdmin>,

    /// Service version
    pub version: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:3000".to_string(),
            users_path: PathBuf::from("./data/users.json"),
            jwt_secret: String::new(),
            jwt_issuer: "student-portal".to_string(),
            token_ttl_secs: 2 * 60 * 60,
            otp_ttl_secs: 5 * 60,
            reset_session_ttl_secs: 15 * 60,
            cookie_secure: false,
            mail: None,
            bootstrap_admin: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. `JWT_SECRET` is required.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        if let Some(addr) = get("HTTP_ADDR") {
            config.http_addr = addr;
        }

        if let Some(path) = get("USERS_PATH") {
            config.users_path = PathBuf::from(path);
        }

        if let Some(issuer) = get("JWT_ISSUER") {
            config.jwt_issuer = issuer;
        }

        if let Some(ttl) = get("TOKEN_TTL_SECS") {
            config.token_ttl_secs = parse_ttl("TOKEN_TTL_SECS", ttl)?;
        }

        if let Some(ttl) = get("OTP_TTL_SECS") {
            config.otp_ttl_secs = parse_ttl("OTP_TTL_SECS", ttl)?;
        }

        if let Some(ttl) = get("RESET_SESSION_TTL_SECS") {
            config.reset_session_ttl_secs = parse_ttl("RESET_SESSION_TTL_SECS", ttl)?;
        }

        if let Some(secure) = get("COOKIE_SECURE") {
            config.cookie_secure = secure.to_lowercase() == "true" || secure == "1";
        }

        if let Some(api_url) = get("MAIL_API_URL").filter(|s| !s.is_empty()) {
            config.mail = Some(MailConfig {
                api_url,
                api_key: get("MAIL_API_KEY").unwrap_or_default(),
                from: get("MAIL_FROM").unwrap_or_else(|| "Student System <no-reply@localhost>".to_string()),
            });
        }

        if let (Some(username), Some(email), Some(password)) =
            (get("ADMIN_USERNAME"), get("ADMIN_EMAIL"), get("ADMIN_PASSWORD"))
        {
            config.bootstrap_admin = Some(NewAdmin {
                fullname: get("ADMIN_FULLNAME").unwrap_or_else(|| "Administrator".to_string()),
                username,
                email,
                password,
            });
        }

        Ok(config)
    }

    pub fn jwt(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_issuer.clone(), self.token_ttl_secs)
    }
}

fn parse_ttl(key: &'static str, value: String) -> Result<i64, ConfigError> {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidTtl { key, value }),
    }
}
