//! OmniDesk API client

pub mod auth;
pub mod categories;
pub mod comments;
pub mod error;
pub mod portal;
pub mod session;
pub mod tickets;
pub mod users;

use crate::types::{ErrorBody, RefreshResponse};
use error::ClientError;
use portal::PortalClient;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, ClientBuilder, Request, Response, StatusCode};
use session::{MemoryTokenStore, TokenStore};
use std::sync::Arc;
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

const DEFAULT_USER_AGENT: &str = concat!("omnidesk-client/", env!("CARGO_PKG_VERSION"));

/// Authenticated OmniDesk API client
///
/// Every request goes out with the stored access token. When the backend
/// answers 401, the client exchanges the stored refresh token for a new
/// access token once and replays the request. If that is not possible the
/// session is reported as expired.
#[derive(Clone)]
pub struct OmnideskClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl OmnideskClient {
    /// Create a new client with default configuration and in-memory tokens
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    #[must_use]
    pub fn builder() -> OmnideskClientBuilder {
        OmnideskClientBuilder::default()
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store shared by this client
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Whether an access token is currently stored
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    /// Unauthenticated client for the public portal endpoints
    #[must_use]
    pub fn portal(&self) -> PortalClient {
        PortalClient::from_parts(self.client.clone(), self.base_url.clone())
    }

    /// Create a request builder for `path` relative to the base URL
    ///
    /// Authentication is applied when the request is executed.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute an authenticated request, refreshing the session on 401
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if the access token was
    /// rejected and could not be renewed, or the mapped error status
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send_authenticated(request).await?;
        decode(response).await
    }

    /// Execute a request without attaching or refreshing credentials
    ///
    /// # Errors
    ///
    /// Returns the mapped error status or a transport error
    pub async fn execute_public<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }

    async fn send_authenticated(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ClientError> {
        let mut request = request.build()?;
        let replay = request.try_clone();

        if let Some(token) = self.tokens.access_token() {
            set_bearer(&mut request, &token)?;
        }

        debug!(method = %request.method(), url = %request.url(), "Sending request");
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut replay) = replay else {
            warn!("Request body cannot be replayed, returning 401 as is");
            return Ok(response);
        };

        let access_token = self.renew_session().await?;
        set_bearer(&mut replay, &access_token)?;

        info!(method = %replay.method(), url = %replay.url(), "Replaying request with refreshed token");
        Ok(self.client.execute(replay).await?)
    }

    /// Swap the refresh token for a new access token after a 401
    ///
    /// A failed exchange clears both tokens. A missing refresh token leaves
    /// the store untouched.
    async fn renew_session(&self) -> Result<String, ClientError> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            warn!("Access token rejected and no refresh token is stored");
            return Err(ClientError::SessionExpired);
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(access_token) => {
                self.tokens.set_access_token(&access_token)?;
                info!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                if let Err(clear_error) = self.tokens.clear() {
                    warn!(error = %clear_error, "Failed to clear stored tokens");
                }
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Call `/auth/refresh` with the given refresh token
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let request = self
            .request(reqwest::Method::POST, "/auth/refresh")
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({}));
        let response: RefreshResponse = self.execute_public(request).await?;
        Ok(response.access_token)
    }
}

/// Builder for OmnideskClient
#[derive(Default)]
pub struct OmnideskClientBuilder {
    base_url: Option<String>,
    token_store: Option<Arc<dyn TokenStore>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl OmnideskClientBuilder {
    /// Set the base URL, e.g. `http://localhost:5000/api`
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set where access and refresh tokens are kept
    #[must_use]
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or invalid, or the HTTP
    /// client cannot be built
    pub fn build(self) -> Result<OmnideskClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = normalize_base_url(&base_url)?;

        let mut client_builder = ClientBuilder::new()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder.build()?;

        let tokens = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(OmnideskClient {
            client,
            base_url,
            tokens,
        })
    }
}

/// Validate a base URL and strip any trailing slash
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ClientError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ClientError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::Configuration(format!(
            "base_url must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn default_client() -> Result<Client, ClientError> {
    Ok(ClientBuilder::new().user_agent(DEFAULT_USER_AGENT).build()?)
}

fn set_bearer(request: &mut Request, token: &str) -> Result<(), ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    request.headers_mut().insert(header::AUTHORIZATION, value);
    Ok(())
}

/// Turn a response into `T`, or into the error its status and body describe
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        debug!(status = status.as_u16(), %message, "Request failed");
        Err(ClientError::from_status(status, message))
    }
}

/// The backend's `message` field, else the raw body, else the status line
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        return error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
