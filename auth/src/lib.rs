//! # Check-in Console Authentication
//!
//! Session handling for the console:
//!
//! - **Issuance**: after a successful credential exchange the backend access
//!   token is sealed into an encrypted session token ([`SessionGate::issue`])
//! - **Validation**: every protected command validates the stored token
//!   ([`SessionGate::require`]), checking authenticity, issuer, audience and
//!   expiry, and terminates the session on failure
//! - **Storage**: [`SessionStore`] abstracts where the token lives
//!   ([`FileSessionStore`] in production)
//!
//! There is no refresh flow: an expired session means logging in again.
//!
//! ## Example
//!
//! ```
//! use checkin_auth::{SessionConfig, SessionGate, SessionUser};
//! use checkin_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), checkin_auth::SessionError> {
//! let gate = SessionGate::new(SessionConfig::new("s3cret"), Arc::new(SystemClock))?;
//! let user = SessionUser {
//!     id: "1".to_string(),
//!     name: "Ana Lima".to_string(),
//!     login: "ana.lima".to_string(),
//! };
//!
//! let token = gate.issue(&user, "backend-token")?;
//! let claims = gate.validate(&token)?;
//! assert_eq!(claims.access_token.as_deref(), Some("backend-token"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod store;
pub mod token;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use config::{KeyDerivation, SessionConfig};
pub use error::{Result, SessionError};
pub use gate::{SessionGate, SessionUser};
pub use store::{FileSessionStore, SessionStore};
pub use token::{Audience, SessionClaims, SessionKey};
