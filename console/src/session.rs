//! Login, logout, signup and the per-command session check.

use crate::error::ConsoleError;
use crate::forms::{self, SignupForm};
use checkin_api::{ApiClient, AuthenticatedUser, MessageResult};
use checkin_auth::{SessionClaims, SessionError, SessionGate, SessionStore, SessionUser};
use std::sync::Arc;

/// Session operations of the console.
#[derive(Clone)]
pub struct SessionService {
    gate: SessionGate,
    store: Arc<dyn SessionStore>,
    client: ApiClient,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("gate", &self.gate)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    /// `client` must be unauthenticated; it is used for login and signup.
    #[must_use]
    pub fn new(gate: SessionGate, store: Arc<dyn SessionStore>, client: ApiClient) -> Self {
        Self { gate, store, client }
    }

    /// Exchange credentials with the backend and store a fresh session.
    ///
    /// # Errors
    ///
    /// - [`ConsoleError::Validation`]: empty user or password
    /// - [`ConsoleError::Login`]: the backend refused or answered without a
    ///   token or user id
    /// - [`ConsoleError::Session`]: the session could not be sealed or stored
    pub async fn login(&self, usuario: &str, senha: &str) -> Result<AuthenticatedUser, ConsoleError> {
        let credentials = forms::validate_login(usuario, senha).map_err(ConsoleError::Validation)?;
        let user = self.client.login(&credentials).await?;

        let session_user = SessionUser {
            id: user.id.clone(),
            name: user.nome.clone(),
            login: user.usuario.clone(),
        };
        let token = self.gate.issue(&session_user, &user.token)?;
        self.store.save(&token)?;

        tracing::info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    /// Forget the stored session. Succeeds when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] if the session file cannot be removed.
    pub fn logout(&self) -> Result<(), ConsoleError> {
        self.store.terminate()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] if the form is invalid; backend
    /// failures come back as an unsuccessful [`MessageResult`].
    pub async fn signup(&self, form: SignupForm) -> Result<MessageResult, ConsoleError> {
        let user = form.validate().map_err(ConsoleError::Validation)?;
        Ok(self.client.create_user(&user).await)
    }

    /// Validate the stored session, terminating it on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] when the session is missing, invalid
    /// or expired.
    pub fn require(&self) -> Result<SessionClaims, ConsoleError> {
        Ok(self.gate.require(self.store.as_ref())?)
    }

    /// A client carrying the session's backend token, terminating the
    /// session on any 401.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] when the session is not usable.
    pub fn authenticated_client(&self) -> Result<ApiClient, ConsoleError> {
        let claims = self.require()?;
        let Some(token) = claims.access_token else {
            self.store.terminate()?;
            return Err(SessionError::Invalid {
                reason: "sem token de acesso".to_string(),
            }
            .into());
        };

        Ok(self
            .client
            .clone()
            .with_access_token(token)
            .with_session_store(Arc::clone(&self.store)))
    }
}
