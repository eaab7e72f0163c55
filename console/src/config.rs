//! Configuration management for the console.
//!
//! Loads configuration from environment variables (after reading `.env`, if
//! present) with sensible defaults.

use checkin_api::DEFAULT_API_URL;
use checkin_auth::{KeyDerivation, SessionConfig};
use std::env;
use std::path::PathBuf;

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend configuration
    pub api: ApiConfig,
    /// Session configuration
    pub session: SessionSettings,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the check-in backend
    pub url: String,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Secret the session key is derived from
    pub secret: Option<String>,
    /// How the key is derived from the secret
    pub key_derivation: KeyDerivation,
    /// Expected `iss` claim
    pub issuer: Option<String>,
    /// Expected `aud` claim
    pub audience: Option<String>,
    /// Where the session token is stored
    pub file: PathBuf,
    /// Session lifetime in seconds
    pub max_age_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                url: env::var("CHECKIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            },
            session: SessionSettings {
                secret: env::var("CHECKIN_SESSION_SECRET").ok().filter(|s| !s.is_empty()),
                key_derivation: env::var("CHECKIN_SESSION_KEY_MODE")
                    .ok()
                    .and_then(|s| KeyDerivation::parse(&s))
                    .unwrap_or_default(),
                issuer: env::var("CHECKIN_JWT_ISSUER").ok().filter(|s| !s.is_empty()),
                audience: env::var("CHECKIN_JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
                file: env::var("CHECKIN_SESSION_FILE")
                    .map_or_else(|_| default_session_file(), PathBuf::from),
                max_age_secs: env::var("CHECKIN_SESSION_MAX_AGE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|secs: &i64| *secs > 0)
                    .unwrap_or(86_400), // 24 hours
            },
            log_filter: "checkin_console=info,checkin=info".to_string(),
        }
    }
}

impl SessionSettings {
    /// Gate configuration, if a secret is configured.
    #[must_use]
    pub fn gate_config(&self) -> Option<SessionConfig> {
        let secret = self.secret.as_ref()?;
        let mut config = SessionConfig::new(secret.clone())
            .with_key_derivation(self.key_derivation)
            .with_max_age(chrono::Duration::seconds(self.max_age_secs));
        if let Some(issuer) = &self.issuer {
            config = config.with_issuer(issuer.clone());
        }
        if let Some(audience) = &self.audience {
            config = config.with_audience(audience.clone());
        }
        Some(config)
    }
}

fn default_session_file() -> PathBuf {
    env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".checkin-console")
        .join("session")
}
