//! Backend entities, as transmitted over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend identifier.
pub type Id = i64;

/// Ticket lifecycle state.
///
/// `Disponivel → Reservado → Usado → Cancelado`, and
/// `Disponivel | Reservado → Cancelado`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTicket {
    /// Generated, not yet assigned
    Disponivel,
    /// Assigned to a participant
    Reservado,
    /// Checked in
    Usado,
    /// Will never be used
    Cancelado,
}

impl StatusTicket {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Disponivel, Self::Reservado, Self::Usado, Self::Cancelado];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disponivel => "Disponivel",
            Self::Reservado => "Reservado",
            Self::Usado => "Usado",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Still open for assignment or check-in.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Disponivel | Self::Reservado)
    }
}

impl fmt::Display for StatusTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`StatusTicket`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status inválido: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for StatusTicket {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('í', "i");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A person attending events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participante {
    /// Backend id (0 before creation)
    #[serde(default)]
    pub id: Id,
    /// Full name
    pub nome_completo: String,
    /// E-mail address
    pub email: String,
    /// Phone, `(DD) DDDDD-DDDD`
    pub telefone: String,
    /// Back-reference, only present when the backend expands it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<Ticket>>,
}

/// An event with a fixed capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evento {
    /// Backend id
    #[serde(default)]
    pub id: Id,
    /// Event name
    pub nome: String,
    /// When the event happens
    #[serde(with = "wire_date")]
    pub data_evento: DateTime<Utc>,
    /// How many tickets generation creates
    pub capacidade_total: u32,
    /// Venue
    pub local: String,
    /// Tickets of this event, absent until generated or expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<Ticket>>,
}

impl Evento {
    /// Tickets of this event, empty when absent.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        self.tickets.as_deref().unwrap_or_default()
    }
}

/// Admission to one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Backend id
    #[serde(default)]
    pub id: Id,
    /// Lifecycle state
    pub status: StatusTicket,
    /// Issue timestamp
    #[serde(default, with = "wire_date::option")]
    pub data_emissao: Option<DateTime<Utc>>,
    /// Check-in timestamp
    #[serde(default, with = "wire_date::option")]
    pub data_uso: Option<DateTime<Utc>>,
    /// Holder
    #[serde(default)]
    pub participante: Option<Participante>,
    /// Event, when expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evento: Option<Box<Evento>>,
    /// Snack redemption, once redeemed
    #[serde(default)]
    pub resgate_lanche: Option<ResgateLanche>,
}

impl Ticket {
    /// Id of the holder, if any.
    #[must_use]
    pub fn participante_id(&self) -> Option<Id> {
        self.participante.as_ref().map(|p| p.id)
    }
}

/// A snack that ticket holders can redeem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lanche {
    /// Backend id
    #[serde(default)]
    pub id: Id,
    /// Name
    pub nome: String,
    /// Description
    pub descricao: String,
    /// Stock
    pub quantidade_disponivel: i64,
    /// Redemptions, when expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resgates: Option<Vec<ResgateLanche>>,
}

/// One snack redeemed against one ticket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResgateLanche {
    /// Backend id
    #[serde(default)]
    pub id: Option<Id>,
    /// Ticket, when expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Box<Ticket>>,
    /// Snack
    #[serde(default)]
    pub lanche: Option<Lanche>,
    /// When it was redeemed
    #[serde(default, with = "wire_date::option")]
    pub data_resgate: Option<DateTime<Utc>>,
}

/// Login form payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login
    pub usuario: String,
    /// Password
    pub senha: String,
}

/// Signup payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Full name
    pub nome: String,
    /// Login
    pub usuario: String,
    /// Password
    pub senha: String,
}

/// Raw `/usuarios/login` response; either field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Backend bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Authenticated user
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// User part of the login response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    /// User id, a number or a string depending on the backend
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Display name
    #[serde(default)]
    pub nome: Option<String>,
    /// Login
    #[serde(default)]
    pub usuario: Option<String>,
}

/// A successful login: token and user are both present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Backend bearer token
    pub token: String,
    /// User id
    pub id: String,
    /// Display name
    pub nome: String,
    /// Login
    pub usuario: String,
}

impl LoginResponse {
    /// Accept the response only if it carries a token and a user id.
    #[must_use]
    pub fn authenticated(self) -> Option<AuthenticatedUser> {
        let token = self.token.filter(|t| !t.is_empty())?;
        let user = self.user?;
        let id = match user.id? {
            serde_json::Value::String(id) if !id.is_empty() => id,
            serde_json::Value::Number(id) => id.to_string(),
            _ => return None,
        };

        Some(AuthenticatedUser {
            token,
            id,
            nome: user.nome.unwrap_or_default(),
            usuario: user.usuario.unwrap_or_default(),
        })
    }
}

/// Dates as the backend sends them: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC), or a bare `YYYY-MM-DD` (midnight UTC).
pub mod wire_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse a wire date.
    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(timestamp.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Serialize as RFC 3339.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    /// Deserialize any accepted wire format.
    ///
    /// # Errors
    ///
    /// Fails on strings in none of the accepted formats.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    /// Nullable variant.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize as RFC 3339 or `null`.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)] // serde `with` passes `&Option<T>`
        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize `null`, a missing field or any accepted wire format.
        ///
        /// # Errors
        ///
        /// Fails on strings in none of the accepted formats.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| {
                    super::parse(&raw)
                        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
                })
                .transpose()
        }
    }
}
