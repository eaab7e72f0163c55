//! User-facing notifications produced by reducers.

use checkin_api::MessageResult;
use std::fmt;

/// How a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The backend accepted the operation
    Success,
    /// The backend rejected it or could not be reached
    Error,
    /// Refused locally; nothing was sent
    Warning,
}

/// One toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind
    pub severity: Severity,
    /// Text
    pub message: String,
}

impl Notification {
    /// Success toast.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Error toast.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Warning toast for local refusals.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Whether this reports a failure of any kind.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self.severity, Severity::Success)
    }
}

impl From<&MessageResult> for Notification {
    fn from(result: &MessageResult) -> Self {
        if result.success {
            Self::success(result.message())
        } else {
            Self::error(result.message())
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Success => "ok",
            Severity::Error => "erro",
            Severity::Warning => "aviso",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
