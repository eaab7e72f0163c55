//! The four CRUD collections the backend exposes.

use crate::types::{Evento, Id, Lanche, Participante, Ticket};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// A named backend collection, served under `/{name}s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `/participantes`
    Participante,
    /// `/eventos`
    Evento,
    /// `/tickets`
    Ticket,
    /// `/lanches`
    Lanche,
}

impl ResourceKind {
    /// Every collection.
    pub const ALL: [Self; 4] = [Self::Participante, Self::Evento, Self::Ticket, Self::Lanche];

    /// Lowercase resource name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Participante => "participante",
            Self::Evento => "evento",
            Self::Ticket => "ticket",
            Self::Lanche => "lanche",
        }
    }

    /// Capitalised name used in notifications.
    #[must_use]
    pub const fn capitalized(self) -> &'static str {
        match self {
            Self::Participante => "Participante",
            Self::Evento => "Evento",
            Self::Ticket => "Ticket",
            Self::Lanche => "Lanche",
        }
    }

    /// Collection path, e.g. `/eventos`.
    #[must_use]
    pub fn collection_path(self) -> String {
        format!("/{}s", self.name())
    }

    /// Member path, e.g. `/eventos/3`.
    #[must_use]
    pub fn member_path(self, id: Id) -> String {
        format!("/{}s/{id}", self.name())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entity stored in one of the [`ResourceKind`] collections.
pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Collection holding this entity.
    const KIND: ResourceKind;

    /// Backend id.
    fn id(&self) -> Id;
}

impl Resource for Participante {
    const KIND: ResourceKind = ResourceKind::Participante;

    fn id(&self) -> Id {
        self.id
    }
}

impl Resource for Evento {
    const KIND: ResourceKind = ResourceKind::Evento;

    fn id(&self) -> Id {
        self.id
    }
}

impl Resource for Ticket {
    const KIND: ResourceKind = ResourceKind::Ticket;

    fn id(&self) -> Id {
        self.id
    }
}

impl Resource for Lanche {
    const KIND: ResourceKind = ResourceKind::Lanche;

    fn id(&self) -> Id {
        self.id
    }
}
