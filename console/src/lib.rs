//! # Check-in Console
//!
//! Administrative console for event check-in, built on the reducer/store
//! architecture:
//!
//! - [`crud`]: generic list page (load, create, update, delete) used for
//!   participants and snacks
//! - [`workflow`]: the events page, composing the CRUD reducer with the ticket
//!   workflow (generate, edit, finalize, redeem snack)
//! - [`policy`]: client-side ticket rules checked before any request
//! - [`forms`]: form validation with the messages users see
//! - [`session`]: login, logout, signup and the per-command session check
//! - [`cli`] and [`render`]: the terminal surface
//!
//! ## Example
//!
//! ```
//! use checkin_api::StatusTicket;
//! use checkin_console::policy::transition_allowed;
//!
//! assert!(transition_allowed(StatusTicket::Disponivel, StatusTicket::Reservado));
//! assert!(!transition_allowed(StatusTicket::Cancelado, StatusTicket::Disponivel));
//! ```

pub mod cli;
pub mod config;
pub mod crud;
pub mod environment;
pub mod error;
pub mod forms;
pub mod notification;
pub mod policy;
pub mod render;
pub mod session;
pub mod workflow;

pub use cli::{Answer, Cli, Command, Confirm, Console, StdinConfirm};
pub use config::Config;
pub use environment::ConsoleEnvironment;
pub use error::{ConsoleError, PolicyError};
pub use notification::{Notification, Severity};
pub use session::SessionService;
pub use workflow::{EventosAction, EventosReducer, EventosState, EventosStore};
