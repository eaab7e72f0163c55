//! In-memory [`Backend`] following the check-in backend's rules.

use checkin_api::result::Expectation;
use checkin_api::{
    ApiError, Backend, Evento, Id, Lanche, MessageResult, OpResult, Participante, ResgateLanche,
    ResourceKind, StatusTicket, Ticket,
};
use checkin_core::environment::{Clock, SystemClock};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Db {
    participantes: BTreeMap<Id, Participante>,
    eventos: BTreeMap<Id, Evento>,
    /// Ticket id → (evento id, ticket)
    tickets: BTreeMap<Id, (Id, Ticket)>,
    lanches: BTreeMap<Id, Lanche>,
    last_id: Id,
    injected: Option<(u16, String)>,
    calls: Vec<String>,
}

impl Db {
    fn allocate(&mut self, requested: Id, taken: impl Fn(Id) -> bool) -> Id {
        if requested > 0 && !taken(requested) {
            self.last_id = self.last_id.max(requested);
            return requested;
        }
        self.last_id += 1;
        while taken(self.last_id) {
            self.last_id += 1;
        }
        self.last_id
    }

    fn tickets_of(&self, evento_id: Id) -> Vec<Ticket> {
        self.tickets
            .values()
            .filter(|(owner, _)| *owner == evento_id)
            .map(|(_, ticket)| ticket.clone())
            .collect()
    }

    fn evento_view(&self, evento: &Evento) -> Evento {
        Evento {
            tickets: Some(self.tickets_of(evento.id)),
            ..evento.clone()
        }
    }

    fn ticket_view(&self, evento_id: Id, ticket: &Ticket) -> Ticket {
        Ticket {
            evento: self.eventos.get(&evento_id).cloned().map(Box::new),
            ..ticket.clone()
        }
    }
}

/// A fake check-in backend.
///
/// Implements the same status-code contract as the HTTP backend: 201 on
/// create, 200 on update, 204 on delete and on the ticket workflow endpoints.
/// Rejections carry a `{"message": ...}` body and go through the same message
/// extraction as real HTTP errors.
///
/// Clones share state, so a test can keep one handle for seeding and
/// inspection while the store owns another.
#[derive(Clone)]
pub struct InMemoryBackend {
    db: Arc<Mutex<Db>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend").finish_non_exhaustive()
    }
}

impl InMemoryBackend {
    /// Empty backend on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Empty backend stamping dates from `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            db: Arc::new(Mutex::new(Db::default())),
            clock: Arc::new(clock),
        }
    }

    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every following request with `status` and `body`.
    pub fn fail_with(&self, status: u16, body: impl Into<String>) {
        self.db().injected = Some((status, body.into()));
    }

    /// Stop injecting failures.
    pub fn recover(&self) {
        self.db().injected = None;
    }

    /// Requests received so far, as `"METHOD path"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.db().calls.clone()
    }

    /// Insert a participant directly, returning its id.
    pub fn seed_participante(&self, participante: Participante) -> Id {
        let mut db = self.db();
        let id = {
            let taken = db.participantes.keys().copied().collect::<Vec<_>>();
            db.allocate(participante.id, |id| taken.contains(&id))
        };
        db.participantes.insert(id, Participante { id, ..participante });
        id
    }

    /// Insert an event directly, returning its id.
    pub fn seed_evento(&self, evento: Evento) -> Id {
        let mut db = self.db();
        let id = {
            let taken = db.eventos.keys().copied().collect::<Vec<_>>();
            db.allocate(evento.id, |id| taken.contains(&id))
        };
        db.eventos.insert(id, Evento { id, tickets: None, ..evento });
        id
    }

    /// Insert a ticket of `evento_id` directly, returning its id.
    pub fn seed_ticket(&self, evento_id: Id, ticket: Ticket) -> Id {
        let mut db = self.db();
        let id = {
            let taken = db.tickets.keys().copied().collect::<Vec<_>>();
            db.allocate(ticket.id, |id| taken.contains(&id))
        };
        db.tickets.insert(id, (evento_id, Ticket { id, evento: None, ..ticket }));
        id
    }

    /// Insert a snack directly, returning its id.
    pub fn seed_lanche(&self, lanche: Lanche) -> Id {
        let mut db = self.db();
        let id = {
            let taken = db.lanches.keys().copied().collect::<Vec<_>>();
            db.allocate(lanche.id, |id| taken.contains(&id))
        };
        db.lanches.insert(id, Lanche { id, ..lanche });
        id
    }

    /// Current tickets of `evento_id`.
    #[must_use]
    pub fn tickets_of(&self, evento_id: Id) -> Vec<Ticket> {
        self.db().tickets_of(evento_id)
    }

    /// A stored ticket.
    #[must_use]
    pub fn ticket(&self, id: Id) -> Option<Ticket> {
        self.db().tickets.get(&id).map(|(_, ticket)| ticket.clone())
    }

    /// A stored snack.
    #[must_use]
    pub fn lanche(&self, id: Id) -> Option<Lanche> {
        self.db().lanches.get(&id).cloned()
    }

    /// All stored events, without tickets.
    #[must_use]
    pub fn eventos(&self) -> Vec<Evento> {
        self.db().eventos.values().cloned().collect()
    }

    /// Record the call and return the injected failure, if any.
    fn enter(db: &mut Db, call: String) -> Option<ApiError> {
        db.calls.push(call);
        db.injected
            .clone()
            .map(|(status, body)| ApiError::Status { status, body })
    }

    fn reject(status: u16, message: &str, expectation: &Expectation) -> MessageResult {
        let error = ApiError::Status {
            status,
            body: json!({ "message": message }).to_string(),
        };
        MessageResult::failure(error.user_message(&expectation.fallback))
    }

    fn create(&self, kind: ResourceKind, payload: Value) -> MessageResult {
        let expectation = Expectation::create(kind);
        let mut db = self.db();
        if let Some(error) = Self::enter(&mut db, format!("POST {}", kind.collection_path())) {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        let stored = match kind {
            ResourceKind::Participante => serde_json::from_value::<Participante>(payload)
                .map(|p| {
                    let taken = db.participantes.keys().copied().collect::<Vec<_>>();
                    let id = db.allocate(p.id, |id| taken.contains(&id));
                    db.participantes.insert(id, Participante { id, tickets: None, ..p });
                }),
            ResourceKind::Evento => serde_json::from_value::<Evento>(payload).map(|e| {
                let taken = db.eventos.keys().copied().collect::<Vec<_>>();
                let id = db.allocate(e.id, |id| taken.contains(&id));
                db.eventos.insert(id, Evento { id, tickets: None, ..e });
            }),
            ResourceKind::Ticket => serde_json::from_value::<Ticket>(payload).map(|t| {
                let evento_id = t.evento.as_ref().map_or(0, |e| e.id);
                let taken = db.tickets.keys().copied().collect::<Vec<_>>();
                let id = db.allocate(t.id, |id| taken.contains(&id));
                db.tickets.insert(id, (evento_id, Ticket { id, evento: None, ..t }));
            }),
            ResourceKind::Lanche => serde_json::from_value::<Lanche>(payload).map(|l| {
                let taken = db.lanches.keys().copied().collect::<Vec<_>>();
                let id = db.allocate(l.id, |id| taken.contains(&id));
                db.lanches.insert(id, Lanche { id, ..l });
            }),
        };

        match stored {
            Ok(()) => expectation.judge(201),
            Err(error) => Self::reject(400, &format!("Payload inválido: {error}"), &expectation),
        }
    }

    fn replace(&self, kind: ResourceKind, id: Id, payload: Value) -> MessageResult {
        let expectation = Expectation::update(kind);
        let mut db = self.db();
        if let Some(error) = Self::enter(&mut db, format!("PUT {}", kind.member_path(id))) {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        let outcome = match kind {
            ResourceKind::Participante => serde_json::from_value::<Participante>(payload).map(|p| {
                db.participantes
                    .get_mut(&id)
                    .map(|slot| *slot = Participante { id, tickets: None, ..p })
            }),
            ResourceKind::Evento => serde_json::from_value::<Evento>(payload).map(|e| {
                db.eventos
                    .get_mut(&id)
                    .map(|slot| *slot = Evento { id, tickets: None, ..e })
            }),
            ResourceKind::Ticket => serde_json::from_value::<Ticket>(payload).map(|t| {
                db.tickets
                    .get_mut(&id)
                    .map(|(_, slot)| *slot = Ticket { id, evento: None, ..t })
            }),
            ResourceKind::Lanche => serde_json::from_value::<Lanche>(payload).map(|l| {
                db.lanches
                    .get_mut(&id)
                    .map(|slot| *slot = Lanche { id, ..l })
            }),
        };

        match outcome {
            Ok(Some(())) => expectation.judge(200),
            Ok(None) => Self::reject(404, &format!("{} não encontrado", kind.capitalized()), &expectation),
            Err(error) => Self::reject(400, &format!("Payload inválido: {error}"), &expectation),
        }
    }

    fn remove(&self, kind: ResourceKind, id: Id) -> MessageResult {
        let expectation = Expectation::delete(kind);
        let mut db = self.db();
        if let Some(error) = Self::enter(&mut db, format!("DELETE {}", kind.member_path(id))) {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        let found = match kind {
            ResourceKind::Participante => db.participantes.remove(&id).is_some(),
            ResourceKind::Evento => {
                let found = db.eventos.remove(&id).is_some();
                db.tickets.retain(|_, (owner, _)| *owner != id);
                found
            },
            ResourceKind::Ticket => db.tickets.remove(&id).is_some(),
            ResourceKind::Lanche => db.lanches.remove(&id).is_some(),
        };

        if found {
            expectation.judge(204)
        } else {
            Self::reject(404, &format!("{} não encontrado", kind.capitalized()), &expectation)
        }
    }

    fn list(&self, kind: ResourceKind) -> OpResult<Vec<Value>> {
        let mut db = self.db();
        if Self::enter(&mut db, format!("GET {}", kind.collection_path())).is_some() {
            return OpResult::failed(Vec::new());
        }

        let values: Result<Vec<Value>, _> = match kind {
            ResourceKind::Participante => db.participantes.values().map(serde_json::to_value).collect(),
            ResourceKind::Evento => db
                .eventos
                .values()
                .map(|e| serde_json::to_value(db.evento_view(e)))
                .collect(),
            ResourceKind::Ticket => db
                .tickets
                .values()
                .map(|(owner, t)| serde_json::to_value(db.ticket_view(*owner, t)))
                .collect(),
            ResourceKind::Lanche => db.lanches.values().map(serde_json::to_value).collect(),
        };

        values.map_or_else(|_| OpResult::failed(Vec::new()), OpResult::ok)
    }

    fn today(&self) -> OpResult<Vec<Evento>> {
        let today = self.clock.today();
        let mut db = self.db();
        if Self::enter(&mut db, "GET /eventos/hoje".to_string()).is_some() {
            return OpResult::failed(Vec::new());
        }

        OpResult::ok(
            db.eventos
                .values()
                .filter(|e| e.data_evento.date_naive() == today)
                .map(|e| db.evento_view(e))
                .collect(),
        )
    }

    fn generate(&self, evento_id: Id) -> MessageResult {
        let expectation = Expectation::generate_tickets();
        let now = self.clock.now();
        let mut db = self.db();
        if let Some(error) =
            Self::enter(&mut db, format!("GET /eventos/generateTickets/{evento_id}"))
        {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        let Some(capacity) = db.eventos.get(&evento_id).map(|e| e.capacidade_total) else {
            return Self::reject(404, "Evento não encontrado", &expectation);
        };
        if !db.tickets_of(evento_id).is_empty() {
            return Self::reject(409, "Evento já possui tickets", &expectation);
        }

        for _ in 0..capacity {
            let taken = db.tickets.keys().copied().collect::<Vec<_>>();
            let id = db.allocate(0, |id| taken.contains(&id));
            db.tickets.insert(
                id,
                (
                    evento_id,
                    Ticket {
                        id,
                        status: StatusTicket::Disponivel,
                        data_emissao: Some(now),
                        data_uso: None,
                        participante: None,
                        evento: None,
                        resgate_lanche: None,
                    },
                ),
            );
        }

        expectation.judge(204)
    }

    fn sweep(&self, evento_id: Id) -> MessageResult {
        let expectation = Expectation::sweep_tickets();
        let now = self.clock.now();
        let mut db = self.db();
        if let Some(error) =
            Self::enter(&mut db, format!("GET /eventos/finalizeTickets/{evento_id}"))
        {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        if !db.eventos.contains_key(&evento_id) {
            return Self::reject(404, "Evento não encontrado", &expectation);
        }

        for (owner, ticket) in db.tickets.values_mut() {
            if *owner != evento_id || !ticket.status.is_open() {
                continue;
            }
            if ticket.participante.is_some() {
                ticket.status = StatusTicket::Usado;
                ticket.data_uso.get_or_insert(now);
            } else {
                ticket.status = StatusTicket::Cancelado;
            }
        }

        expectation.judge(204)
    }

    fn redeem(&self, ticket_id: Id, lanche_id: Id) -> MessageResult {
        let expectation = Expectation::redeem_lanche();
        let now = self.clock.now();
        let mut db = self.db();
        if let Some(error) = Self::enter(
            &mut db,
            format!("GET /tickets/reedemLanche?ticket={ticket_id}&lanche={lanche_id}"),
        ) {
            return MessageResult::failure(error.user_message(&expectation.fallback));
        }

        let Some(mut lanche) = db.lanches.get(&lanche_id).cloned() else {
            return Self::reject(404, "Lanche não encontrado", &expectation);
        };
        let Some((_, ticket)) = db.tickets.get(&ticket_id) else {
            return Self::reject(404, "Ticket não encontrado", &expectation);
        };
        if ticket.status != StatusTicket::Usado {
            return Self::reject(400, "Ticket não foi utilizado", &expectation);
        }
        if ticket.resgate_lanche.is_some() {
            return Self::reject(409, "Lanche já resgatado para este ticket", &expectation);
        }
        if lanche.quantidade_disponivel <= 0 {
            return Self::reject(409, "Lanche esgotado", &expectation);
        }

        lanche.quantidade_disponivel -= 1;
        let resgate_id = db.allocate(0, |_| false);
        let resgate = ResgateLanche {
            id: Some(resgate_id),
            ticket: None,
            lanche: Some(Lanche {
                resgates: None,
                ..lanche.clone()
            }),
            data_resgate: Some(now),
        };
        db.lanches.insert(lanche_id, lanche);
        if let Some((_, ticket)) = db.tickets.get_mut(&ticket_id) {
            ticket.resgate_lanche = Some(resgate);
        }

        expectation.judge(204)
    }
}

impl Backend for InMemoryBackend {
    fn create_one(&self, kind: ResourceKind, payload: Value) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.create(kind, payload) })
    }

    fn update(&self, kind: ResourceKind, id: Id, payload: Value) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.replace(kind, id, payload) })
    }

    fn delete_by_id(&self, kind: ResourceKind, id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.remove(kind, id) })
    }

    fn find_all(&self, kind: ResourceKind) -> BoxFuture<'_, OpResult<Vec<Value>>> {
        Box::pin(async move { self.list(kind) })
    }

    fn find_today_events(&self) -> BoxFuture<'_, OpResult<Vec<Evento>>> {
        Box::pin(async move { self.today() })
    }

    fn generate_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.generate(evento_id) })
    }

    fn sweep_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.sweep(evento_id) })
    }

    fn redeem_lanche(&self, ticket_id: Id, lanche_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move { self.redeem(ticket_id, lanche_id) })
    }
}
