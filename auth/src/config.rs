//! Session configuration.

use chrono::Duration;

/// How the 256-bit content-encryption key is derived from the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDerivation {
    /// `SHA-256(secret)`. Works for any secret.
    #[default]
    Sha256,
    /// The secret is a base64 string that decodes to exactly 32 bytes.
    Base64,
}

impl KeyDerivation {
    /// Parse the `CHECKIN_SESSION_KEY_MODE` value (`sha256` or `base64`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha256" => Some(Self::Sha256),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shared secret the encryption key is derived from.
    pub secret: String,

    /// Key derivation scheme.
    pub key_derivation: KeyDerivation,

    /// Expected `iss` claim. Not checked when `None`.
    pub issuer: Option<String>,

    /// Expected `aud` claim. Not checked when `None`.
    pub audience: Option<String>,

    /// Lifetime of a freshly issued session.
    ///
    /// Default: 24 hours
    pub max_age: Duration,
}

impl SessionConfig {
    /// Create a configuration with the default key derivation and lifetime.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            key_derivation: KeyDerivation::default(),
            issuer: None,
            audience: None,
            max_age: Duration::hours(24),
        }
    }

    /// Set the key derivation scheme.
    #[must_use]
    pub const fn with_key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = key_derivation;
        self
    }

    /// Require and stamp an issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require and stamp an audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the session lifetime.
    #[must_use]
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_parse() {
        assert_eq!(KeyDerivation::parse("SHA256"), Some(KeyDerivation::Sha256));
        assert_eq!(KeyDerivation::parse(" base64 "), Some(KeyDerivation::Base64));
        assert_eq!(KeyDerivation::parse("hkdf"), None);
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new("s3cret");
        assert_eq!(config.key_derivation, KeyDerivation::Sha256);
        assert_eq!(config.max_age, Duration::hours(24));
        assert!(config.issuer.is_none());
        assert!(config.audience.is_none());
    }
}
