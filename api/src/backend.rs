//! The backend contract the console is written against.

use crate::result::{MessageResult, OpResult};
use crate::resource::ResourceKind;
use crate::types::{Evento, Id};
use futures::future::BoxFuture;
use serde_json::Value;

/// Operations the check-in backend offers.
///
/// Every method resolves to an [`OpResult`]; failures are reported through
/// `success = false`, never as an error or panic. Payloads and lists are
/// untyped JSON here; [`Gateway`](crate::Gateway) adds the typed layer.
///
/// Methods return [`BoxFuture`] so the trait stays usable as
/// `Arc<dyn Backend>` inside reducer environments.
pub trait Backend: Send + Sync {
    /// `POST /{resource}s`, success iff 201.
    fn create_one(&self, kind: ResourceKind, payload: Value) -> BoxFuture<'_, MessageResult>;

    /// `PUT /{resource}s/{id}`, success iff 200.
    fn update(&self, kind: ResourceKind, id: Id, payload: Value) -> BoxFuture<'_, MessageResult>;

    /// `DELETE /{resource}s/{id}`, success iff 204.
    fn delete_by_id(&self, kind: ResourceKind, id: Id) -> BoxFuture<'_, MessageResult>;

    /// `GET /{resource}s`, success on any 2xx with a decodable list.
    fn find_all(&self, kind: ResourceKind) -> BoxFuture<'_, OpResult<Vec<Value>>>;

    /// `GET /eventos/hoje`, same semantics as [`Backend::find_all`].
    fn find_today_events(&self) -> BoxFuture<'_, OpResult<Vec<Evento>>>;

    /// `GET /eventos/generateTickets/{id}`, success iff 204.
    fn generate_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult>;

    /// `GET /eventos/finalizeTickets/{id}`, success iff 204.
    fn sweep_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult>;

    /// `GET /tickets/reedemLanche?ticket={ticket}&lanche={lanche}`, success iff 204.
    fn redeem_lanche(&self, ticket_id: Id, lanche_id: Id) -> BoxFuture<'_, MessageResult>;
}
