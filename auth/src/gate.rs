//! The session gate: issues session tokens at login and validates them before
//! every protected command.

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::store::SessionStore;
use crate::token::{Audience, SessionClaims, SessionKey};
use checkin_core::environment::Clock;
use std::sync::Arc;

/// The user a session is issued for, as returned by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    /// Backend user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login.
    pub login: String,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionGate {
    config: SessionConfig,
    key: SessionKey,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("max_age", &self.config.max_age)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Build a gate from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKey`] if no key can be derived from the
    /// configured secret.
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let key = SessionKey::derive(&config.secret, config.key_derivation)?;
        Ok(Self { config, key, clock })
    }

    /// Issue a session token wrapping the backend `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EncryptionFailed`] if the token cannot be sealed.
    pub fn issue(&self, user: &SessionUser, access_token: &str) -> Result<String> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: user.id.clone(),
            name: Some(user.name.clone()),
            email: Some(user.login.clone()),
            access_token: Some(access_token.to_string()),
            iat: Some(now.timestamp()),
            exp: Some((now + self.config.max_age).timestamp()),
            jti: Some(random_jti()),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone().map(Audience::One),
        };

        let token = self.key.encrypt(&claims)?;
        tracing::debug!(user_id = %user.id, exp = ?claims.exp, "Session issued");
        Ok(token)
    }

    /// Validate a token: authenticity, issuer, audience, then expiry.
    ///
    /// A token without `exp` never expires.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Invalid`]: malformed or not sealed with our key
    /// - [`SessionError::IssuerMismatch`] / [`SessionError::AudienceMismatch`]
    /// - [`SessionError::Expired`]: `now >= exp`
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let claims = self.key.decrypt(token)?;

        if let Some(expected) = &self.config.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(SessionError::IssuerMismatch);
            }
        }

        if let Some(expected) = &self.config.audience {
            if !claims.aud.as_ref().is_some_and(|aud| aud.contains(expected)) {
                return Err(SessionError::AudienceMismatch);
            }
        }

        if let Some(exp) = claims.exp {
            if self.clock.now().timestamp() >= exp {
                return Err(SessionError::Expired);
            }
        }

        Ok(claims)
    }

    /// Load the stored session and validate it.
    ///
    /// On any failure the stored session is terminated before the error is
    /// returned, so the next command starts from a clean login.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Missing`] when nothing is stored, otherwise the
    /// validation error.
    pub fn require(&self, store: &dyn SessionStore) -> Result<SessionClaims> {
        let outcome = store
            .load()
            .and_then(|token| token.ok_or(SessionError::Missing))
            .and_then(|token| self.validate(&token));

        if let Err(error) = &outcome {
            tracing::warn!(%error, "Session rejected, terminating");
            if let Err(terminate_error) = store.terminate() {
                tracing::error!(error = %terminate_error, "Failed to terminate session");
            }
        }

        outcome
    }
}

fn random_jti() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
