//! Error types for the check-in backend client

use crate::result::failure_message;
use thiserror::Error;

/// Errors that can occur when talking to the check-in backend.
///
/// Gateway operations never surface these to callers: they are folded into an
/// [`OpResult`](crate::OpResult) with [`ApiError::user_message`]. Login is the
/// one place they escape as `Err`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[error("{0}")]
    RequestFailed(String),

    /// The backend answered with a non-2xx status
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Request payload could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The login response carried no token or no user id
    #[error("Usuário ou senha inválidos")]
    InvalidCredentials,
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the user for this error.
    ///
    /// Priority: `message` field of a JSON error body, the raw body, the
    /// transport message, then `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { body, .. } => {
                failure_message(Some(body), Some(&self.to_string()), fallback)
            },
            Self::RequestFailed(message) => failure_message(None, Some(message), fallback),
            Self::ResponseParseFailed(_) | Self::Serialization(_) | Self::InvalidCredentials => {
                failure_message(None, None, fallback)
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed(error.to_string())
    }
}
