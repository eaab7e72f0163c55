//! Command-line surface: argument parsing and command execution.
//!
//! Every command except `login`, `logout` and `signup` validates the stored
//! session first. Backend outcomes are reported as the notification the
//! reducers produce; a failed or refused operation becomes an error so the
//! process exits non-zero.

use crate::crud::{CrudAction, CrudReducer, CrudState, CrudStore};
use crate::environment::ConsoleEnvironment;
use crate::error::ConsoleError;
use crate::forms::{EventoForm, LancheForm, ParticipanteForm, SignupForm};
use crate::notification::Notification;
use crate::policy::{self, StatusFilter, TicketEdit};
use crate::render;
use crate::session::SessionService;
use crate::workflow::{EventosAction, EventosReducer, EventosState, EventosStore};
use checkin_api::types::wire_date;
use checkin_api::{Backend, Gateway, Id, Lanche, Participante, Resource, StatusTicket, Ticket};
use checkin_core::environment::Clock;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "checkin")]
#[command(about = "Console administrativo de check-in de eventos")]
#[command(
    after_help = "Environment:\n  CHECKIN_API_URL          Backend base URL\n  CHECKIN_SESSION_SECRET   Session encryption secret\n  CHECKIN_SESSION_FILE     Where the session is stored\n  RUST_LOG                 Log filter"
)]
pub struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true, default_value_t = false)]
    pub yes: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store a session
    Login {
        #[arg(long)]
        usuario: String,
        #[arg(long)]
        senha: String,
    },
    /// Forget the stored session
    Logout,
    /// Register a new user
    Signup {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        usuario: String,
        #[arg(long)]
        senha: String,
        #[arg(long)]
        repetir_senha: String,
    },
    /// Events and their ticket workflow
    Eventos {
        #[command(subcommand)]
        command: EventosCommand,
    },
    /// Tickets of the loaded events
    Tickets {
        #[command(subcommand)]
        command: TicketsCommand,
    },
    /// Participants
    Participantes {
        #[command(subcommand)]
        command: ParticipantesCommand,
    },
    /// Snacks
    Lanches {
        #[command(subcommand)]
        command: LanchesCommand,
    },
    /// Redeem a snack against a used ticket
    Resgatar {
        #[arg(long)]
        ticket: Id,
        #[arg(long)]
        lanche: Id,
    },
}

/// Event commands.
#[derive(Debug, Subcommand)]
pub enum EventosCommand {
    /// List all
    Listar,
    /// Events happening today
    Hoje,
    /// Create an event
    Criar {
        #[arg(long)]
        nome: String,
        /// `YYYY-MM-DD` or RFC 3339
        #[arg(long)]
        data: String,
        #[arg(long)]
        capacidade: i64,
        #[arg(long)]
        local: String,
    },
    /// Edit an event; omitted fields keep their value
    Editar {
        id: Id,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        capacidade: Option<i64>,
        #[arg(long)]
        local: Option<String>,
    },
    /// Delete after confirmation
    Excluir {
        id: Id,
    },
    /// Create one ticket per seat
    GerarTickets {
        id: Id,
    },
    /// Close the event: holders become Usado, the rest Cancelado
    FinalizarTickets {
        id: Id,
    },
}

/// Ticket commands.
#[derive(Debug, Subcommand)]
pub enum TicketsCommand {
    /// List all
    Listar {
        /// Only this event's tickets
        #[arg(long)]
        evento: Option<Id>,
        /// Disponivel, Reservado, Usado, Cancelado or Todos
        #[arg(long, default_value_t = StatusFilter::Todos)]
        status: StatusFilter,
    },
    /// Edit a ticket; assigning only a participant reserves it
    Editar {
        id: Id,
        #[arg(long)]
        status: Option<StatusTicket>,
        #[arg(long)]
        participante: Option<Id>,
        /// `YYYY-MM-DD` or RFC 3339
        #[arg(long)]
        data_uso: Option<String>,
        #[arg(long)]
        lanche: Option<Id>,
    },
    /// Participants that may be assigned to a ticket
    Participantes {
        id: Id,
    },
}

/// Participant commands.
#[derive(Debug, Subcommand)]
pub enum ParticipantesCommand {
    /// List all
    Listar,
    /// Create a participant
    Criar {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        telefone: String,
    },
    /// Edit a participant; omitted fields keep their value
    Editar {
        id: Id,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telefone: Option<String>,
    },
    /// Delete after confirmation
    Excluir {
        id: Id,
    },
}

/// Snack commands.
#[derive(Debug, Subcommand)]
pub enum LanchesCommand {
    /// List all
    Listar,
    /// Create a snack
    Criar {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        descricao: String,
        #[arg(long, default_value_t = 0)]
        quantidade: i64,
    },
    /// Edit a snack; omitted fields keep their value
    Editar {
        id: Id,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        quantidade: Option<i64>,
    },
    /// Delete after confirmation
    Excluir {
        id: Id,
    },
}

/// Yes/no prompt before destructive commands.
pub trait Confirm: Send + Sync {
    /// Ask `question`.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure.
    fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{question} [s/N] ")?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
    }
}

/// Always answers the same.
#[derive(Debug, Clone, Copy)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&self, _question: &str) -> io::Result<bool> {
        Ok(self.0)
    }
}

/// Runs parsed commands.
pub struct Console {
    session: SessionService,
    clock: Arc<dyn Clock>,
    confirm: Arc<dyn Confirm>,
    backend: Option<Arc<dyn Backend>>,
}

impl Console {
    /// Console talking to the backend through the session's client.
    #[must_use]
    pub fn new(session: SessionService, clock: Arc<dyn Clock>) -> Self {
        Self {
            session,
            clock,
            confirm: Arc::new(StdinConfirm),
            backend: None,
        }
    }

    /// Replace the confirmation prompt.
    #[must_use]
    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Arc::new(confirm);
        self
    }

    /// Send protected commands to `backend` instead of the session's client.
    /// The session is still required.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Execute `cli` and return what should be printed.
    ///
    /// # Errors
    ///
    /// - [`ConsoleError::Session`]: no usable session for a protected command
    /// - [`ConsoleError::Validation`]: a form was invalid; nothing was sent
    /// - [`ConsoleError::Failed`]: the backend rejected the operation, it
    ///   was refused locally, or a load failed
    /// - [`ConsoleError::NotFound`]: a referenced id is unknown
    /// - [`ConsoleError::Cancelled`]: the user declined the prompt
    #[tracing::instrument(skip_all, name = "command")]
    pub async fn run(&self, cli: Cli) -> Result<String, ConsoleError> {
        let yes = cli.yes;
        match cli.command {
            Command::Login { usuario, senha } => {
                let user = self.session.login(&usuario, &senha).await?;
                Ok(format!("Bem-vindo, {}!", user.nome))
            },
            Command::Logout => {
                self.session.logout()?;
                Ok("Sessão encerrada.".to_string())
            },
            Command::Signup {
                nome,
                usuario,
                senha,
                repetir_senha,
            } => {
                let form = SignupForm {
                    nome,
                    usuario,
                    senha,
                    repetir_senha,
                };
                let result = self.session.signup(form).await?;
                report(Some(Notification::from(&result)))
            },
            Command::Eventos { command } => self.eventos(command, yes).await,
            Command::Tickets { command } => self.tickets(command).await,
            Command::Participantes { command } => self.participantes(command, yes).await,
            Command::Lanches { command } => self.lanches(command, yes).await,
            Command::Resgatar { ticket, lanche } => {
                let store = self.load_eventos().await?;
                send_eventos(
                    &store,
                    EventosAction::RedeemLanche {
                        ticket_id: ticket,
                        lanche_id: lanche,
                    },
                )
                .await
            },
        }
    }

    async fn eventos(&self, command: EventosCommand, yes: bool) -> Result<String, ConsoleError> {
        match command {
            EventosCommand::Listar => {
                let store = self.load_eventos().await?;
                let today = self.clock.today();
                Ok(store.state(|s| render::eventos(s.eventos(), today)).await)
            },
            EventosCommand::Hoje => {
                let result = self.environment()?.gateway.find_today_events().await;
                if !result.success {
                    return Err(ConsoleError::Failed("Erro ao carregar eventos de hoje".to_string()));
                }
                Ok(render::eventos(&result.data, self.clock.today()))
            },
            EventosCommand::Criar {
                nome,
                data,
                capacidade,
                local,
            } => {
                let store = self.load_eventos().await?;
                let id = store.state(|s| policy::next_evento_id(s.eventos())).await;
                let evento = EventoForm {
                    nome,
                    data_evento: Some(data),
                    capacidade_total: Some(capacidade),
                    local,
                }
                .validate(id)
                .map_err(ConsoleError::Validation)?;
                send_eventos(&store, EventosAction::Crud(CrudAction::Create(evento))).await
            },
            EventosCommand::Editar {
                id,
                nome,
                data,
                capacidade,
                local,
            } => {
                let store = self.load_eventos().await?;
                let current = store
                    .state(|s| s.evento(id).cloned())
                    .await
                    .ok_or(ConsoleError::NotFound { kind: "Evento", id })?;
                let evento = EventoForm {
                    nome: nome.unwrap_or(current.nome),
                    data_evento: Some(data.unwrap_or_else(|| current.data_evento.to_rfc3339())),
                    capacidade_total: Some(capacidade.unwrap_or_else(|| i64::from(current.capacidade_total))),
                    local: local.unwrap_or(current.local),
                }
                .validate(id)
                .map_err(ConsoleError::Validation)?;
                send_eventos(&store, EventosAction::Crud(CrudAction::Update(evento))).await
            },
            EventosCommand::Excluir { id } => {
                self.confirm(yes, &format!("Excluir evento {id}?"))?;
                let store = self.eventos_store()?;
                send_eventos(&store, EventosAction::Crud(CrudAction::Delete(id))).await
            },
            EventosCommand::GerarTickets { id } => {
                let store = self.load_eventos().await?;
                send_eventos(&store, EventosAction::GenerateTickets { evento_id: id }).await
            },
            EventosCommand::FinalizarTickets { id } => {
                self.confirm(
                    yes,
                    &format!("Finalizar os tickets do evento {id}? Esta ação não pode ser desfeita."),
                )?;
                let store = self.load_eventos().await?;
                send_eventos(&store, EventosAction::SweepTickets { evento_id: id }).await
            },
        }
    }

    async fn tickets(&self, command: TicketsCommand) -> Result<String, ConsoleError> {
        match command {
            TicketsCommand::Listar { evento, status } => {
                let store = self.load_eventos().await?;
                let tickets: Option<Vec<Ticket>> = store
                    .state(|s| match evento {
                        Some(id) => s.evento(id).map(|e| e.tickets().to_vec()),
                        None => Some(s.eventos().iter().flat_map(|e| e.tickets().to_vec()).collect()),
                    })
                    .await;
                let tickets = tickets.ok_or(ConsoleError::NotFound {
                    kind: "Evento",
                    id: evento.unwrap_or_default(),
                })?;
                Ok(render::tickets(&tickets, status))
            },
            TicketsCommand::Editar {
                id,
                status,
                participante,
                data_uso,
                lanche,
            } => {
                let env = self.environment()?;
                let gateway = env.gateway.clone();
                let store = load_eventos_in(env).await?;
                let participante = match participante {
                    Some(pid) => Some(find::<Participante>(&gateway, pid).await?),
                    None => None,
                };
                let lanche = match lanche {
                    Some(lid) => Some(find::<Lanche>(&gateway, lid).await?),
                    None => None,
                };
                let data_uso = match data_uso {
                    Some(raw) => Some(wire_date::parse(&raw).ok_or_else(|| {
                        ConsoleError::Failed(format!("Data de uso inválida: {raw}"))
                    })?),
                    None => None,
                };
                let edit = TicketEdit {
                    status,
                    data_uso,
                    participante,
                    lanche,
                };
                send_eventos(&store, EventosAction::EditTicket { ticket_id: id, edit }).await
            },
            TicketsCommand::Participantes { id } => {
                let env = self.environment()?;
                let gateway = env.gateway.clone();
                let store = load_eventos_in(env).await?;
                let evento_tickets = store
                    .state(|s| s.ticket(id).map(|(e, _)| e.tickets().to_vec()))
                    .await
                    .ok_or(ConsoleError::NotFound { kind: "Ticket", id })?;
                let participantes = load_all::<Participante>(&gateway).await?;
                Ok(render::participantes(policy::assignable_participants(
                    &participantes,
                    &evento_tickets,
                    id,
                )))
            },
        }
    }

    async fn participantes(
        &self,
        command: ParticipantesCommand,
        yes: bool,
    ) -> Result<String, ConsoleError> {
        match command {
            ParticipantesCommand::Listar => {
                let store = self.load_crud::<Participante>().await?;
                Ok(store.state(|s| render::participantes(&s.items)).await)
            },
            ParticipantesCommand::Criar {
                nome,
                email,
                telefone,
            } => {
                let participante = ParticipanteForm {
                    nome_completo: nome,
                    email,
                    telefone,
                }
                .validate(0)
                .map_err(ConsoleError::Validation)?;
                let store = self.crud_store::<Participante>()?;
                send_crud(&store, CrudAction::Create(participante)).await
            },
            ParticipantesCommand::Editar {
                id,
                nome,
                email,
                telefone,
            } => {
                let store = self.load_crud::<Participante>().await?;
                let current = loaded(&store, id).await?;
                let participante = ParticipanteForm {
                    nome_completo: nome.unwrap_or(current.nome_completo),
                    email: email.unwrap_or(current.email),
                    telefone: telefone.unwrap_or(current.telefone),
                }
                .validate(id)
                .map_err(ConsoleError::Validation)?;
                send_crud(&store, CrudAction::Update(participante)).await
            },
            ParticipantesCommand::Excluir { id } => {
                self.confirm(yes, &format!("Excluir participante {id}?"))?;
                let store = self.crud_store::<Participante>()?;
                send_crud(&store, CrudAction::Delete(id)).await
            },
        }
    }

    async fn lanches(&self, command: LanchesCommand, yes: bool) -> Result<String, ConsoleError> {
        match command {
            LanchesCommand::Listar => {
                let store = self.load_crud::<Lanche>().await?;
                Ok(store.state(|s| render::lanches(&s.items)).await)
            },
            LanchesCommand::Criar {
                nome,
                descricao,
                quantidade,
            } => {
                let lanche = LancheForm {
                    nome,
                    descricao,
                    quantidade_disponivel: quantidade,
                }
                .validate(0)
                .map_err(ConsoleError::Validation)?;
                let store = self.crud_store::<Lanche>()?;
                send_crud(&store, CrudAction::Create(lanche)).await
            },
            LanchesCommand::Editar {
                id,
                nome,
                descricao,
                quantidade,
            } => {
                let store = self.load_crud::<Lanche>().await?;
                let current = loaded(&store, id).await?;
                let lanche = LancheForm {
                    nome: nome.unwrap_or(current.nome),
                    descricao: descricao.unwrap_or(current.descricao),
                    quantidade_disponivel: quantidade.unwrap_or(current.quantidade_disponivel),
                }
                .validate(id)
                .map_err(ConsoleError::Validation)?;
                send_crud(&store, CrudAction::Update(lanche)).await
            },
            LanchesCommand::Excluir { id } => {
                self.confirm(yes, &format!("Excluir lanche {id}?"))?;
                let store = self.crud_store::<Lanche>()?;
                send_crud(&store, CrudAction::Delete(id)).await
            },
        }
    }

    fn confirm(&self, yes: bool, question: &str) -> Result<(), ConsoleError> {
        if yes || self.confirm.confirm(question)? {
            Ok(())
        } else {
            Err(ConsoleError::Cancelled)
        }
    }

    fn environment(&self) -> Result<ConsoleEnvironment, ConsoleError> {
        let backend: Arc<dyn Backend> = match &self.backend {
            Some(backend) => {
                self.session.require()?;
                Arc::clone(backend)
            },
            None => Arc::new(self.session.authenticated_client()?),
        };
        Ok(ConsoleEnvironment::new(Gateway::new(backend), Arc::clone(&self.clock)))
    }

    fn eventos_store(&self) -> Result<EventosStore, ConsoleError> {
        Ok(EventosStore::new(
            EventosState::default(),
            EventosReducer::new(),
            self.environment()?,
        ))
    }

    async fn load_eventos(&self) -> Result<EventosStore, ConsoleError> {
        load_eventos_in(self.environment()?).await
    }

    fn crud_store<T: Resource>(&self) -> Result<CrudStore<T>, ConsoleError> {
        Ok(CrudStore::new(CrudState::default(), CrudReducer::new(), self.environment()?))
    }

    async fn load_crud<T: Resource>(&self) -> Result<CrudStore<T>, ConsoleError> {
        let store = self.crud_store::<T>()?;
        store.send(CrudAction::Load).await;
        ensure_loaded(store.state(|s| s.last_notification().cloned()).await)?;
        Ok(store)
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

async fn load_eventos_in(env: ConsoleEnvironment) -> Result<EventosStore, ConsoleError> {
    let store = EventosStore::new(EventosState::default(), EventosReducer::new(), env);
    store.send(EventosAction::Crud(CrudAction::Load)).await;
    ensure_loaded(store.state(|s| s.last_notification().cloned()).await)?;
    Ok(store)
}

fn ensure_loaded(notification: Option<Notification>) -> Result<(), ConsoleError> {
    match notification {
        Some(n) if n.is_failure() => Err(ConsoleError::Failed(n.message)),
        _ => Ok(()),
    }
}

/// The outcome of a command is the first notification it produced; a reload
/// failing afterwards does not turn a success into a failure.
fn report(notification: Option<Notification>) -> Result<String, ConsoleError> {
    match notification {
        Some(n) if n.is_failure() => Err(ConsoleError::Failed(n.message)),
        Some(n) => Ok(n.to_string()),
        None => Ok(String::new()),
    }
}

async fn send_eventos(store: &EventosStore, action: EventosAction) -> Result<String, ConsoleError> {
    let before = store.state(|s| s.notifications().len()).await;
    store.send(action).await;
    report(store.state(|s| s.notifications().get(before).cloned()).await)
}

async fn send_crud<T: Resource>(
    store: &CrudStore<T>,
    action: CrudAction<T>,
) -> Result<String, ConsoleError> {
    let before = store.state(|s| s.notifications.len()).await;
    store.send(action).await;
    report(store.state(|s| s.notifications.get(before).cloned()).await)
}

async fn loaded<T: Resource>(store: &CrudStore<T>, id: Id) -> Result<T, ConsoleError> {
    store
        .state(|s| s.items.iter().find(|item| item.id() == id).cloned())
        .await
        .ok_or(ConsoleError::NotFound {
            kind: T::KIND.capitalized(),
            id,
        })
}

async fn load_all<T: Resource>(gateway: &Gateway) -> Result<Vec<T>, ConsoleError> {
    let result = gateway.find_all::<T>().await;
    if result.success {
        Ok(result.data)
    } else {
        Err(ConsoleError::Failed(format!("Erro ao carregar {}s", T::KIND)))
    }
}

async fn find<T: Resource>(gateway: &Gateway, id: Id) -> Result<T, ConsoleError> {
    load_all::<T>(gateway)
        .await?
        .into_iter()
        .find(|item| item.id() == id)
        .ok_or(ConsoleError::NotFound {
            kind: T::KIND.capitalized(),
            id,
        })
}
