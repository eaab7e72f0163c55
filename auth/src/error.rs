//! Error types for session handling.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Everything that can go wrong between "token on disk" and "validated claims".
///
/// Every variant means the same thing to the caller: the session is not
/// usable, terminate it and send the user back to `login`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// No session token is stored.
    #[error("Nenhuma sessão ativa.")]
    Missing,

    /// The token's `exp` claim is in the past.
    #[error("Sessão expirada.")]
    Expired,

    /// The token could not be parsed or decrypted.
    #[error("Sessão inválida: {reason}")]
    Invalid {
        /// What was wrong with the token
        reason: String,
    },

    /// `iss` does not match the configured issuer.
    #[error("Emissor do token inválido")]
    IssuerMismatch,

    /// `aud` does not contain the configured audience.
    #[error("Audiência do token inválida")]
    AudienceMismatch,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ═══════════════════════════════════════════════════════════

    /// The shared secret cannot produce a 256-bit key.
    #[error("Invalid session key: {0}")]
    InvalidKey(String),

    /// Encryption failed while issuing a token.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Reading or writing the session file failed.
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl SessionError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
