//! Client for the check-in backend.
//!
//! - [`ApiClient`]: reqwest implementation of the [`Backend`] contract, plus
//!   login and signup
//! - [`Gateway`]: typed CRUD over any backend
//! - [`types`]: the wire entities (`Participante`, `Evento`, `Ticket`,
//!   `Lanche`, `ResgateLanche`)
//!
//! Gateway calls never fail with `Err`: every outcome is an [`OpResult`].

pub mod backend;
pub mod client;
pub mod error;
pub mod gateway;
pub mod resource;
pub mod result;
pub mod types;

pub use backend::Backend;
pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use gateway::Gateway;
pub use resource::{Resource, ResourceKind};
pub use result::{Expectation, Message, MessageResult, OpResult};
pub use types::{
    AuthenticatedUser, Credentials, Evento, Id, Lanche, NewUser, Participante, ResgateLanche,
    StatusTicket, Ticket,
};
