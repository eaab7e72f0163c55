//! HTTP implementation of [`Backend`]

use crate::backend::Backend;
use crate::error::ApiError;
use crate::resource::ResourceKind;
use crate::result::{Expectation, MessageResult, OpResult};
use crate::types::{AuthenticatedUser, Credentials, Evento, Id, LoginResponse, NewUser};
use checkin_auth::SessionStore;
use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Default backend location.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Check-in backend client
///
/// One request per call, no retries, no timeouts beyond reqwest's defaults.
/// A 401 on any request terminates the attached session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    access_token: Option<String>,
    session: Option<Arc<dyn SessionStore>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend at `api_url`.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: None,
            session: None,
        }
    }

    /// Send `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Terminate `store` whenever the backend answers 401.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Backend base URL, without trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.api_url));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request; non-2xx becomes [`ApiError::Status`].
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.terminate_session();
        }

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn terminate_session(&self) {
        if let Some(store) = &self.session {
            tracing::warn!("Backend answered 401, terminating session");
            if let Err(error) = store.terminate() {
                tracing::error!(%error, "Failed to terminate session");
            }
        }
    }

    async fn expect(&self, builder: RequestBuilder, expectation: Expectation) -> MessageResult {
        match self.execute(builder).await {
            Ok(response) => {
                let status = response.status().as_u16();
                if status != expectation.status {
                    tracing::warn!(status, expected = expectation.status, "Unexpected status");
                }
                expectation.judge(status)
            },
            Err(error) => {
                tracing::warn!(%error, "Request failed");
                MessageResult::failure(error.user_message(&expectation.fallback))
            },
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> OpResult<Vec<T>> {
        let outcome = async {
            let response = self.execute(self.request(Method::GET, path)).await?;
            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Vec::new());
            }
            serde_json::from_slice::<Vec<T>>(&bytes)
                .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
        }
        .await;

        match outcome {
            Ok(items) => OpResult::ok(items),
            Err(error) => {
                tracing::warn!(path, %error, "List request failed");
                OpResult::failed(Vec::new())
            },
        }
    }

    /// Exchange credentials for a backend token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::RequestFailed`] / [`ApiError::Status`]: the request failed
    /// - [`ApiError::ResponseParseFailed`]: the body is not a login response
    /// - [`ApiError::InvalidCredentials`]: no token or no user id in the response
    #[tracing::instrument(skip(self, credentials), fields(usuario = %credentials.usuario))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedUser, ApiError> {
        let response = self
            .execute(self.request(Method::POST, "/usuarios/login").json(credentials))
            .await?;

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?
            .authenticated()
            .ok_or(ApiError::InvalidCredentials)
    }

    /// Register a new user. Any 2xx is success; the body text is the message.
    pub async fn create_user(&self, user: &NewUser) -> MessageResult {
        let fallback = "Erro ao criar usuário";
        match self
            .execute(self.request(Method::POST, "/usuarios/create").json(user))
            .await
        {
            Ok(response) => {
                let text = response.text().await.unwrap_or_default();
                let message = if text.trim().is_empty() {
                    "Usuário criado com sucesso!".to_string()
                } else {
                    crate::result::failure_message(Some(&text), None, fallback)
                };
                MessageResult::succeeded(message)
            },
            Err(error) => MessageResult::failure(error.user_message(fallback)),
        }
    }
}

impl Backend for ApiClient {
    fn create_one(&self, kind: ResourceKind, payload: Value) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            tracing::debug!(resource = %kind, "create");
            let request = self.request(Method::POST, &kind.collection_path()).json(&payload);
            self.expect(request, Expectation::create(kind)).await
        })
    }

    fn update(&self, kind: ResourceKind, id: Id, payload: Value) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            tracing::debug!(resource = %kind, id, "update");
            let request = self.request(Method::PUT, &kind.member_path(id)).json(&payload);
            self.expect(request, Expectation::update(kind)).await
        })
    }

    fn delete_by_id(&self, kind: ResourceKind, id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            tracing::debug!(resource = %kind, id, "delete");
            let request = self.request(Method::DELETE, &kind.member_path(id));
            self.expect(request, Expectation::delete(kind)).await
        })
    }

    fn find_all(&self, kind: ResourceKind) -> BoxFuture<'_, OpResult<Vec<Value>>> {
        Box::pin(async move { self.fetch_list(&kind.collection_path()).await })
    }

    fn find_today_events(&self) -> BoxFuture<'_, OpResult<Vec<Evento>>> {
        Box::pin(async move { self.fetch_list("/eventos/hoje").await })
    }

    fn generate_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            let request = self.request(Method::GET, &format!("/eventos/generateTickets/{evento_id}"));
            self.expect(request, Expectation::generate_tickets()).await
        })
    }

    fn sweep_tickets(&self, evento_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            let request = self.request(Method::GET, &format!("/eventos/finalizeTickets/{evento_id}"));
            self.expect(request, Expectation::sweep_tickets()).await
        })
    }

    fn redeem_lanche(&self, ticket_id: Id, lanche_id: Id) -> BoxFuture<'_, MessageResult> {
        Box::pin(async move {
            let request = self
                .request(Method::GET, "/tickets/reedemLanche")
                .query(&[("ticket", ticket_id), ("lanche", lanche_id)]);
            self.expect(request, Expectation::redeem_lanche()).await
        })
    }
}
