//! Typed CRUD gateway over a [`Backend`].

use crate::backend::Backend;
use crate::resource::{Resource, ResourceKind};
use crate::result::{Expectation, MessageResult, OpResult};
use crate::types::{Evento, Id};
use std::sync::Arc;

/// Typed entry point for reducers and commands.
///
/// Cheap to clone; all clones share the backend.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Create `payload` in its collection.
    pub async fn create_one<T: Resource>(&self, payload: &T) -> MessageResult {
        match serde_json::to_value(payload) {
            Ok(value) => self.backend.create_one(T::KIND, value).await,
            Err(error) => {
                tracing::error!(resource = %T::KIND, %error, "Failed to serialize payload");
                MessageResult::failure(Expectation::create(T::KIND).fallback)
            },
        }
    }

    /// Replace the stored entity with `payload`, addressed by its id.
    pub async fn update<T: Resource>(&self, payload: &T) -> MessageResult {
        match serde_json::to_value(payload) {
            Ok(value) => self.backend.update(T::KIND, payload.id(), value).await,
            Err(error) => {
                tracing::error!(resource = %T::KIND, %error, "Failed to serialize payload");
                MessageResult::failure(Expectation::update(T::KIND).fallback)
            },
        }
    }

    /// Delete entity `id` from collection `kind`.
    pub async fn delete_by_id(&self, id: Id, kind: ResourceKind) -> MessageResult {
        self.backend.delete_by_id(kind, id).await
    }

    /// Load the whole collection of `T`.
    ///
    /// A list that does not decode as `T` is a failure with an empty list.
    pub async fn find_all<T: Resource>(&self) -> OpResult<Vec<T>> {
        let result = self.backend.find_all(T::KIND).await;
        if !result.success {
            return OpResult::failed(Vec::new());
        }

        match serde_json::from_value(serde_json::Value::Array(result.data)) {
            Ok(items) => OpResult::ok(items),
            Err(error) => {
                tracing::warn!(resource = %T::KIND, %error, "Undecodable list");
                OpResult::failed(Vec::new())
            },
        }
    }

    /// Events happening today.
    pub async fn find_today_events(&self) -> OpResult<Vec<Evento>> {
        self.backend.find_today_events().await
    }

    /// Ask the backend to materialise the tickets of `evento_id`.
    pub async fn generate_tickets(&self, evento_id: Id) -> MessageResult {
        self.backend.generate_tickets(evento_id).await
    }

    /// Ask the backend to finalise the tickets of `evento_id`.
    pub async fn sweep_tickets(&self, evento_id: Id) -> MessageResult {
        self.backend.sweep_tickets(evento_id).await
    }

    /// Redeem `lanche_id` against `ticket_id`.
    pub async fn redeem_lanche(&self, ticket_id: Id, lanche_id: Id) -> MessageResult {
        self.backend.redeem_lanche(ticket_id, lanche_id).await
    }
}
