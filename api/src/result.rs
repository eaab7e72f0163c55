//! Operation results and the user-facing messages they carry.

use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a gateway operation.
///
/// Failures never escape as `Err`: `success` is `false` and `data` holds the
/// message (or an empty list for reads).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResult<T> {
    /// Whether the backend answered with the expected status
    pub success: bool,
    /// Payload: a [`Message`] for writes, the decoded list for reads
    pub data: T,
}

/// Message payload of write operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Text shown in the notification
    pub message: String,
}

/// Result of operations whose payload is a notification message.
pub type MessageResult = OpResult<Message>;

impl<T> OpResult<T> {
    /// Successful result.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    /// Failed result.
    pub const fn failed(data: T) -> Self {
        Self {
            success: false,
            data,
        }
    }

    /// Transform the payload, keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OpResult<U> {
        OpResult {
            success: self.success,
            data: f(self.data),
        }
    }
}

impl MessageResult {
    /// Successful result carrying `message`.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::ok(Message {
            message: message.into(),
        })
    }

    /// Failed result carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failed(Message {
            message: message.into(),
        })
    }

    /// The notification text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.data.message
    }
}

/// What a message-bearing request expects back and what it tells the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// The only status that counts as success
    pub status: u16,
    /// Message on success
    pub success: String,
    /// Message when nothing better is known
    pub fallback: String,
}

impl Expectation {
    /// Build an expectation.
    pub fn new(status: u16, success: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            status,
            success: success.into(),
            fallback: fallback.into(),
        }
    }

    /// `POST /{resource}s`: 201.
    #[must_use]
    pub fn create(kind: ResourceKind) -> Self {
        Self::new(
            201,
            format!("{} criado com sucesso!", kind.capitalized()),
            format!("Erro ao criar {}", kind.name()),
        )
    }

    /// `PUT /{resource}s/:id`: 200.
    #[must_use]
    pub fn update(kind: ResourceKind) -> Self {
        Self::new(
            200,
            format!("{} editado com sucesso!", kind.capitalized()),
            format!("Erro ao editar {}", kind.name()),
        )
    }

    /// `DELETE /{resource}s/:id`: 204.
    #[must_use]
    pub fn delete(kind: ResourceKind) -> Self {
        Self::new(
            204,
            format!("{} excluido com sucesso!", kind.capitalized()),
            format!("Erro ao excluir {}", kind.name()),
        )
    }

    /// `GET /eventos/generateTickets/:id`: 204.
    #[must_use]
    pub fn generate_tickets() -> Self {
        Self::new(204, "Tickets gerados com sucesso!", "Erro ao gerar tickets")
    }

    /// `GET /eventos/finalizeTickets/:id`: 204.
    #[must_use]
    pub fn sweep_tickets() -> Self {
        Self::new(204, "Tickets finalizados com sucesso!", "Erro ao finalizar tickets")
    }

    /// `GET /tickets/reedemLanche`: 204.
    #[must_use]
    pub fn redeem_lanche() -> Self {
        Self::new(204, "Lanche resgatado com sucesso!", "Erro ao resgatar lanche")
    }

    /// Result for a response that arrived with `status`.
    #[must_use]
    pub fn judge(&self, status: u16) -> MessageResult {
        if status == self.status {
            MessageResult::succeeded(self.success.clone())
        } else {
            MessageResult::failure(self.fallback.clone())
        }
    }
}

/// Pick the message for a failed request.
///
/// In order: the `message` field of a JSON body, the body itself (a JSON
/// string is unquoted), the transport message, `fallback`. Blank values are
/// skipped.
#[must_use]
pub fn failure_message(body: Option<&str>, transport: Option<&str>, fallback: &str) -> String {
    if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
        return match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(message)) => message.clone(),
                _ => body.to_string(),
            },
            Ok(Value::String(text)) => text,
            _ => body.to_string(),
        };
    }

    transport
        .filter(|t| !t.trim().is_empty())
        .map_or_else(|| fallback.to_string(), ToString::to_string)
}
