//! Client-side ticket rules.
//!
//! The backend is authoritative; these rules decide which actions the console
//! offers and refuse edits that could never succeed, before any request is
//! sent.

use crate::error::PolicyError;
use checkin_api::{Evento, Id, Lanche, Participante, ResgateLanche, StatusTicket, Ticket};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Whether "generate tickets" is offered: no tickets yet and the event is
/// today or later.
#[must_use]
pub fn can_generate_tickets(evento: &Evento, today: NaiveDate) -> bool {
    evento.tickets().is_empty() && evento.data_evento.date_naive() >= today
}

/// Whether "finalize tickets" is offered: tickets exist, all still open, and
/// the event is today.
#[must_use]
pub fn can_sweep_tickets(evento: &Evento, today: NaiveDate) -> bool {
    let tickets = evento.tickets();
    !tickets.is_empty()
        && tickets.iter().all(|t| t.status.is_open())
        && evento.data_evento.date_naive() == today
}

/// Whether the lifecycle allows moving a ticket from `from` to `to`.
///
/// Keeping the current status is always allowed.
#[must_use]
pub fn transition_allowed(from: StatusTicket, to: StatusTicket) -> bool {
    use StatusTicket::{Cancelado, Disponivel, Reservado, Usado};

    from == to
        || matches!(
            (from, to),
            (Disponivel, Reservado)
                | (Reservado, Usado)
                | (Usado | Disponivel | Reservado, Cancelado)
        )
}

/// Whether a snack can be redeemed against `ticket`.
#[must_use]
pub fn can_redeem_snack(ticket: &Ticket) -> bool {
    ticket.status == StatusTicket::Usado && ticket.resgate_lanche.is_none()
}

/// Participants that may be assigned to `ticket_id`: those holding no other
/// ticket of the same event.
#[must_use]
pub fn assignable_participants<'a>(
    participantes: &'a [Participante],
    evento_tickets: &[Ticket],
    ticket_id: Id,
) -> Vec<&'a Participante> {
    participantes
        .iter()
        .filter(|p| is_assignable(p.id, evento_tickets, ticket_id))
        .collect()
}

fn is_assignable(participante_id: Id, evento_tickets: &[Ticket], ticket_id: Id) -> bool {
    !evento_tickets
        .iter()
        .any(|t| t.id != ticket_id && t.participante_id() == Some(participante_id))
}

/// Id suggested for a new event: one past the highest known id.
#[must_use]
pub fn next_evento_id(eventos: &[Evento]) -> Id {
    eventos.iter().map(|e| e.id).max().map_or(1, |max| max + 1)
}

/// Fields changed in a ticket edit. `None` means left blank or untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketEdit {
    /// Explicit status
    pub status: Option<StatusTicket>,
    /// Usage date
    pub data_uso: Option<DateTime<Utc>>,
    /// Participant to assign
    pub participante: Option<Participante>,
    /// Snack to record
    pub lanche: Option<Lanche>,
}

impl TicketEdit {
    /// Only the participant was filled in.
    #[must_use]
    pub const fn only_participante(&self) -> bool {
        self.participante.is_some()
            && self.status.is_none()
            && self.data_uso.is_none()
            && self.lanche.is_none()
    }
}

/// Apply `edit` to `current`.
///
/// Picking only a participant reserves the ticket, whatever its status was.
/// An explicit status always wins.
#[must_use]
pub fn normalize_ticket_edit(current: &Ticket, edit: &TicketEdit) -> Ticket {
    let status = match edit.status {
        Some(status) => status,
        None if edit.only_participante() => StatusTicket::Reservado,
        None => current.status,
    };

    let resgate_lanche = match &edit.lanche {
        Some(lanche) => Some(ResgateLanche {
            lanche: Some(lanche.clone()),
            ..current.resgate_lanche.clone().unwrap_or_default()
        }),
        None => current.resgate_lanche.clone(),
    };

    Ticket {
        status,
        data_uso: edit.data_uso.or(current.data_uso),
        participante: edit.participante.clone().or_else(|| current.participante.clone()),
        resgate_lanche,
        ..current.clone()
    }
}

/// Normalise `edit` against `current` and check the result.
///
/// The lifecycle check applies only to an explicit status. A participant-only
/// edit is submitted as Reservado whatever the prior status; the backend owns
/// that transition.
///
/// # Errors
///
/// - [`PolicyError::InvalidTransition`]: the explicit status change is not
///   allowed
/// - [`PolicyError::ParticipantUnavailable`]: the participant holds another
///   ticket of the same event
pub fn validate_ticket_edit(
    current: &Ticket,
    edit: &TicketEdit,
    evento_tickets: &[Ticket],
) -> Result<Ticket, PolicyError> {
    let edited = normalize_ticket_edit(current, edit);

    if edit.status.is_some() && !transition_allowed(current.status, edited.status) {
        return Err(PolicyError::InvalidTransition {
            from: current.status,
            to: edited.status,
        });
    }

    match edited.participante_id() {
        Some(id) if edited.participante_id() != current.participante_id()
            && !is_assignable(id, evento_tickets, current.id) =>
        {
            Err(PolicyError::ParticipantUnavailable)
        },
        _ => Ok(edited),
    }
}

/// Ticket table filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every ticket
    #[default]
    Todos,
    /// Tickets in one status
    Only(StatusTicket),
}

impl StatusFilter {
    /// Whether `ticket` passes the filter.
    #[must_use]
    pub fn matches(self, ticket: &Ticket) -> bool {
        match self {
            Self::Todos => true,
            Self::Only(status) => ticket.status == status,
        }
    }

    /// The tickets that pass the filter.
    #[must_use]
    pub fn apply<'a>(self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|t| self.matches(t)).collect()
    }
}

impl FromStr for StatusFilter {
    type Err = checkin_api::types::ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("todos") {
            Ok(Self::Todos)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todos => f.write_str("Todos"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn ticket(id: Id, status: StatusTicket, participante: Option<Id>) -> Ticket {
        Ticket {
            id,
            status,
            data_emissao: None,
            data_uso: None,
            participante: participante.map(|id| Participante {
                id,
                nome_completo: format!("Participante {id}"),
                ..Participante::default()
            }),
            evento: None,
            resgate_lanche: None,
        }
    }

    fn evento_on(d: u32, tickets: Option<Vec<Ticket>>) -> Evento {
        Evento {
            id: 1,
            nome: "Feira".to_string(),
            data_evento: Utc.with_ymd_and_hms(2025, 3, d, 19, 0, 0).unwrap(),
            capacidade_total: 2,
            local: "Praça".to_string(),
            tickets,
        }
    }

    fn any_status() -> impl Strategy<Value = StatusTicket> {
        prop::sample::select(StatusTicket::ALL.to_vec())
    }

    #[test]
    fn test_generate_offered_for_empty_future_events() {
        assert!(can_generate_tickets(&evento_on(10, None), day(10)));
        assert!(can_generate_tickets(&evento_on(11, Some(vec![])), day(10)));
        assert!(!can_generate_tickets(&evento_on(9, None), day(10)));

        let with_tickets = evento_on(11, Some(vec![ticket(1, StatusTicket::Disponivel, None)]));
        assert!(!can_generate_tickets(&with_tickets, day(10)));
    }

    #[test]
    fn test_sweep_offered_only_on_event_day_with_open_tickets() {
        let open = Some(vec![
            ticket(1, StatusTicket::Disponivel, None),
            ticket(2, StatusTicket::Reservado, Some(5)),
        ]);
        assert!(can_sweep_tickets(&evento_on(10, open.clone()), day(10)));
        assert!(!can_sweep_tickets(&evento_on(11, open), day(10)));
        assert!(!can_sweep_tickets(&evento_on(10, None), day(10)));

        let swept = Some(vec![ticket(1, StatusTicket::Usado, Some(5))]);
        assert!(!can_sweep_tickets(&evento_on(10, swept), day(10)));
    }

    #[test]
    fn test_transitions() {
        use StatusTicket::{Cancelado, Disponivel, Reservado, Usado};

        assert!(transition_allowed(Disponivel, Reservado));
        assert!(transition_allowed(Reservado, Usado));
        assert!(transition_allowed(Usado, Cancelado));
        assert!(transition_allowed(Disponivel, Cancelado));
        assert!(!transition_allowed(Disponivel, Usado));
        assert!(!transition_allowed(Usado, Reservado));
        assert!(!transition_allowed(Cancelado, Disponivel));
        assert!(transition_allowed(Cancelado, Cancelado));
    }

    #[test]
    fn test_explicit_status_wins_over_reservation() {
        let current = ticket(1, StatusTicket::Disponivel, None);
        let edit = TicketEdit {
            status: Some(StatusTicket::Cancelado),
            participante: Some(Participante { id: 3, ..Participante::default() }),
            ..TicketEdit::default()
        };

        let edited = normalize_ticket_edit(&current, &edit);

        assert_eq!(edited.status, StatusTicket::Cancelado);
        assert_eq!(edited.participante_id(), Some(3));
    }

    #[test]
    fn test_edit_keeps_untouched_fields() {
        let mut current = ticket(1, StatusTicket::Usado, Some(2));
        current.data_uso = Some(Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap());
        let lanche = Lanche { id: 8, nome: "Suco".to_string(), ..Lanche::default() };

        let edited = normalize_ticket_edit(
            &current,
            &TicketEdit { lanche: Some(lanche), ..TicketEdit::default() },
        );

        assert_eq!(edited.status, StatusTicket::Usado);
        assert_eq!(edited.data_uso, current.data_uso);
        assert_eq!(edited.participante_id(), Some(2));
        assert_eq!(
            edited.resgate_lanche.and_then(|r| r.lanche).map(|l| l.id),
            Some(8)
        );
    }

    #[test]
    fn test_participant_already_holding_a_ticket_is_refused() {
        let tickets = vec![
            ticket(1, StatusTicket::Reservado, Some(7)),
            ticket(2, StatusTicket::Disponivel, None),
        ];
        let edit = TicketEdit {
            participante: Some(Participante { id: 7, ..Participante::default() }),
            ..TicketEdit::default()
        };

        assert_eq!(
            validate_ticket_edit(&tickets[1], &edit, &tickets),
            Err(PolicyError::ParticipantUnavailable)
        );
        // Re-saving the holder's own ticket is fine
        assert!(validate_ticket_edit(&tickets[0], &edit, &tickets).is_ok());
    }

    #[test]
    fn test_participant_only_edit_reserves_closed_tickets() {
        let edit = TicketEdit {
            participante: Some(Participante { id: 4, ..Participante::default() }),
            ..TicketEdit::default()
        };

        for status in [StatusTicket::Usado, StatusTicket::Cancelado] {
            let current = ticket(1, status, None);
            let edited = validate_ticket_edit(&current, &edit, &[current.clone()]).unwrap();
            assert_eq!(edited.status, StatusTicket::Reservado);
            assert_eq!(edited.participante_id(), Some(4));
        }
    }

    #[test]
    fn test_explicit_status_still_follows_lifecycle() {
        let current = ticket(1, StatusTicket::Cancelado, None);
        let edit = TicketEdit {
            status: Some(StatusTicket::Disponivel),
            ..TicketEdit::default()
        };

        assert_eq!(
            validate_ticket_edit(&current, &edit, &[current.clone()]),
            Err(PolicyError::InvalidTransition {
                from: StatusTicket::Cancelado,
                to: StatusTicket::Disponivel,
            })
        );
    }

    #[test]
    fn test_assignable_participants_excludes_holders() {
        let participantes: Vec<Participante> = (1..=3)
            .map(|id| Participante { id, ..Participante::default() })
            .collect();
        let tickets = vec![
            ticket(10, StatusTicket::Reservado, Some(1)),
            ticket(11, StatusTicket::Reservado, Some(2)),
        ];

        let ids: Vec<Id> = assignable_participants(&participantes, &tickets, 11)
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_redeem_requires_used_ticket_without_redemption() {
        assert!(can_redeem_snack(&ticket(1, StatusTicket::Usado, Some(1))));
        assert!(!can_redeem_snack(&ticket(1, StatusTicket::Reservado, Some(1))));

        let mut redeemed = ticket(1, StatusTicket::Usado, Some(1));
        redeemed.resgate_lanche = Some(ResgateLanche::default());
        assert!(!can_redeem_snack(&redeemed));
    }

    #[test]
    fn test_next_evento_id() {
        assert_eq!(next_evento_id(&[]), 1);
        let mut other = evento_on(10, None);
        other.id = 9;
        assert_eq!(next_evento_id(&[evento_on(10, None), other]), 10);
    }

    #[test]
    fn test_status_filter() {
        let tickets = vec![
            ticket(1, StatusTicket::Disponivel, None),
            ticket(2, StatusTicket::Usado, Some(1)),
        ];

        assert_eq!("Todos".parse::<StatusFilter>().unwrap().apply(&tickets).len(), 2);
        let used = "usado".parse::<StatusFilter>().unwrap().apply(&tickets);
        assert_eq!(used.len(), 1);
        assert_eq!(used[0].id, 2);
        assert!("Perdido".parse::<StatusFilter>().is_err());
    }

    proptest! {
        #[test]
        fn prop_only_participant_reserves(status in any_status(), holder in proptest::option::of(1i64..100)) {
            let current = ticket(1, status, holder);
            let edit = TicketEdit {
                participante: Some(Participante { id: 500, ..Participante::default() }),
                ..TicketEdit::default()
            };

            let edited = normalize_ticket_edit(&current, &edit);

            prop_assert_eq!(edited.status, StatusTicket::Reservado);
            prop_assert_eq!(edited.participante_id(), Some(500));
        }

        #[test]
        fn prop_explicit_status_always_wins(current in any_status(), requested in any_status()) {
            let edit = TicketEdit {
                status: Some(requested),
                participante: Some(Participante { id: 500, ..Participante::default() }),
                ..TicketEdit::default()
            };

            prop_assert_eq!(normalize_ticket_edit(&ticket(1, current, None), &edit).status, requested);
        }

        #[test]
        fn prop_cancelado_is_terminal(to in any_status()) {
            prop_assert_eq!(
                transition_allowed(StatusTicket::Cancelado, to),
                to == StatusTicket::Cancelado
            );
        }
    }
}
