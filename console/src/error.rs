//! Console errors.

use checkin_api::{ApiError, StatusTicket};
use checkin_auth::SessionError;
use thiserror::Error;

/// Errors surfaced by console commands.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// No valid session; the user must log in again
    #[error("{0} Execute `checkin login` para entrar novamente.")]
    Session(#[from] SessionError),

    /// `CHECKIN_SESSION_SECRET` is not set
    #[error("CHECKIN_SESSION_SECRET não configurado")]
    MissingSecret,

    /// Login failed
    #[error("Falha no login: {0}")]
    Login(#[from] ApiError),

    /// Form validation failed; nothing was sent
    #[error("Formulário inválido:\n{0}")]
    Validation(crate::forms::FieldErrors),

    /// A rule refused the action locally; nothing was sent
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A referenced entity is not in the loaded data
    #[error("{kind} {id} não encontrado")]
    NotFound {
        /// Capitalised resource name
        kind: &'static str,
        /// Requested id
        id: i64,
    },

    /// The backend reported failure
    #[error("{0}")]
    Failed(String),

    /// The user declined the confirmation prompt
    #[error("Operação cancelada")]
    Cancelled,

    /// Terminal I/O failed
    #[error("Erro de entrada/saída: {0}")]
    Io(#[from] std::io::Error),
}

/// Client-side business rule refusals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// Status change not allowed by the ticket lifecycle
    #[error("Transição de status inválida: {from} → {to}")]
    InvalidTransition {
        /// Current status
        from: StatusTicket,
        /// Requested status
        to: StatusTicket,
    },

    /// The participant already holds another ticket of this event
    #[error("Participante já possui ticket para este evento")]
    ParticipantUnavailable,

    /// Generation not offered for this event
    #[error("Evento já possui tickets ou já aconteceu")]
    GenerateUnavailable,

    /// Sweep not offered for this event
    #[error("Tickets só podem ser finalizados no dia do evento, com todos disponíveis ou reservados")]
    SweepUnavailable,

    /// Ticket is not used or already redeemed a snack
    #[error("Ticket precisa estar Usado e sem resgate para resgatar lanche")]
    RedeemUnavailable,
}
