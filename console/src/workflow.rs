//! The events page: event CRUD plus the ticket workflow (generate, edit,
//! finalize, redeem snack).
//!
//! Every backend call is one request with no retry. The event list is
//! reloaded from the backend after a successful call and left untouched after
//! a failure. Rule violations are refused locally with a warning and never
//! reach the network.

use crate::crud::{CrudAction, CrudReducer, CrudState};
use crate::environment::ConsoleEnvironment;
use crate::error::PolicyError;
use crate::notification::Notification;
use crate::policy::{self, TicketEdit};
use checkin_api::{Evento, Gateway, Id, MessageResult, Ticket};
use checkin_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use checkin_runtime::Store;
use std::future::Future;

/// State of the events page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventosState {
    /// Loaded events and notifications
    pub crud: CrudState<Evento>,
}

impl EventosState {
    /// Loaded events.
    #[must_use]
    pub fn eventos(&self) -> &[Evento] {
        &self.crud.items
    }

    /// A loaded event.
    #[must_use]
    pub fn evento(&self, id: Id) -> Option<&Evento> {
        self.crud.items.iter().find(|e| e.id == id)
    }

    /// A loaded ticket with its event.
    #[must_use]
    pub fn ticket(&self, id: Id) -> Option<(&Evento, &Ticket)> {
        self.crud
            .items
            .iter()
            .find_map(|e| e.tickets().iter().find(|t| t.id == id).map(|t| (e, t)))
    }

    /// Notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.crud.notifications
    }

    /// Most recent notification.
    #[must_use]
    pub fn last_notification(&self) -> Option<&Notification> {
        self.crud.last_notification()
    }
}

/// Actions of the events page.
#[derive(Debug, Clone)]
pub enum EventosAction {
    /// Event list CRUD
    Crud(CrudAction<Evento>),
    /// Materialise the tickets of an event
    GenerateTickets {
        /// Event
        evento_id: Id,
    },
    /// Finalize the tickets of an event (holders → Usado, rest → Cancelado)
    SweepTickets {
        /// Event
        evento_id: Id,
    },
    /// Edit one ticket
    EditTicket {
        /// Ticket
        ticket_id: Id,
        /// Changed fields
        edit: TicketEdit,
    },
    /// Redeem a snack against a ticket
    RedeemLanche {
        /// Ticket
        ticket_id: Id,
        /// Snack
        lanche_id: Id,
    },
    /// A workflow request finished
    WorkflowCompleted {
        /// Backend outcome
        result: MessageResult,
        /// Reload the event list on success
        reload: bool,
    },
}

/// Reducer for the events page.
#[derive(Default)]
pub struct EventosReducer {
    crud: CrudReducer<Evento>,
}

/// Store running the [`EventosReducer`].
pub type EventosStore = Store<EventosState, EventosAction, ConsoleEnvironment, EventosReducer>;

impl EventosReducer {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            crud: CrudReducer::new(),
        }
    }

    fn refuse(state: &mut EventosState, reason: &impl ToString) -> SmallVec<[Effect<EventosAction>; 4]> {
        let message = reason.to_string();
        tracing::warn!(%message, "Refused locally");
        state.crud.notifications.push(Notification::warning(message));
        smallvec![]
    }

    fn request<F, Fut>(env: &ConsoleEnvironment, reload: bool, call: F) -> Effect<EventosAction>
    where
        F: FnOnce(Gateway) -> Fut,
        Fut: Future<Output = MessageResult> + Send + 'static,
    {
        let pending = call(env.gateway.clone());
        Effect::future(async move {
            Some(EventosAction::WorkflowCompleted {
                result: pending.await,
                reload,
            })
        })
    }
}

impl Reducer for EventosReducer {
    type State = EventosState;
    type Action = EventosAction;
    type Environment = ConsoleEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per workflow step
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            EventosAction::Crud(action) => self
                .crud
                .reduce(&mut state.crud, action, env)
                .into_iter()
                .map(|effect| effect.map(EventosAction::Crud))
                .collect(),

            EventosAction::GenerateTickets { evento_id } => {
                let Some(evento) = state.evento(evento_id) else {
                    return Self::refuse(state, &not_found("Evento", evento_id));
                };
                if !policy::can_generate_tickets(evento, env.clock.today()) {
                    return Self::refuse(state, &PolicyError::GenerateUnavailable);
                }

                tracing::info!(evento_id, "Generating tickets");
                smallvec![Self::request(env, true, move |gateway| async move {
                    gateway.generate_tickets(evento_id).await
                })]
            },

            EventosAction::SweepTickets { evento_id } => {
                let Some(evento) = state.evento(evento_id) else {
                    return Self::refuse(state, &not_found("Evento", evento_id));
                };
                if !policy::can_sweep_tickets(evento, env.clock.today()) {
                    return Self::refuse(state, &PolicyError::SweepUnavailable);
                }

                tracing::info!(evento_id, "Finalizing tickets");
                smallvec![Self::request(env, true, move |gateway| async move {
                    gateway.sweep_tickets(evento_id).await
                })]
            },

            EventosAction::EditTicket { ticket_id, edit } => {
                let Some((evento, current)) = state.ticket(ticket_id) else {
                    return Self::refuse(state, &not_found("Ticket", ticket_id));
                };
                let edited = match policy::validate_ticket_edit(current, &edit, evento.tickets()) {
                    Ok(edited) => edited,
                    Err(refusal) => return Self::refuse(state, &refusal),
                };

                tracing::info!(ticket_id, status = %edited.status, "Editing ticket");
                smallvec![Self::request(env, true, move |gateway| async move {
                    gateway.update(&edited).await
                })]
            },

            EventosAction::RedeemLanche {
                ticket_id,
                lanche_id,
            } => {
                if state
                    .ticket(ticket_id)
                    .is_some_and(|(_, ticket)| !policy::can_redeem_snack(ticket))
                {
                    return Self::refuse(state, &PolicyError::RedeemUnavailable);
                }

                tracing::info!(ticket_id, lanche_id, "Redeeming snack");
                smallvec![Self::request(env, false, move |gateway| async move {
                    gateway.redeem_lanche(ticket_id, lanche_id).await
                })]
            },

            EventosAction::WorkflowCompleted { result, reload } => {
                tracing::info!(success = result.success, "{}", result.message());
                state.crud.notifications.push(Notification::from(&result));
                if result.success && reload {
                    self.reduce(state, EventosAction::Crud(CrudAction::Load), env)
                } else {
                    smallvec![]
                }
            },
        }
    }
}

fn not_found(kind: &str, id: Id) -> String {
    format!("{kind} {id} não encontrado")
}
