//! Tunda REST API gateway.
//!
//! # Architecture
//!
//! - [`Transport`] is the one seam to the network: it sends a request and
//!   returns status + body, nothing more. [`HttpTransport`] implements it
//!   over `reqwest` with an explicit per-request timeout; tests substitute a
//!   scripted transport.
//! - [`ApiGateway`] wraps the transport with the two concerns every call
//!   shares: attaching the `Authorization: JWT <access>` header, and the
//!   single transparent refresh-and-retry when a response comes back 401.
//!   The already-retried flag is explicit state in the dispatch path, so the
//!   at-most-one-retry invariant is visible in the control flow rather than
//!   hidden in a mutated request object.
//! - `auth`, `carts` and `listings` are thin typed wrappers over the gateway.
//!
//! # Refresh protocol
//!
//! On a 401 for a not-yet-retried request:
//! - no refresh token stored: emit [`ClientEvent::SessionExpired`] and hand
//!   the 401 back to the caller (there are no tokens to clear);
//! - refresh token stored: call the refresh endpoint once. Success persists
//!   the new access token and re-issues the original request exactly once;
//!   whatever comes back (including a second 401) is returned verbatim.
//!   Failure clears both tokens, emits `SessionExpired`, and propagates the
//!   refresh failure to the original caller.

mod auth;
mod carts;
mod listings;
pub mod types;

pub use auth::AuthApi;
pub use carts::CartApi;
pub use listings::{ListingApi, ListingQuery};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::events::{ClientEvent, EventBus};
use crate::storage::TokenStore;

/// Authorization header scheme the backend expects.
const AUTH_SCHEME: &str = "JWT";

/// Token refresh endpoint, called by the gateway itself.
const REFRESH_PATH: &str = "/users/jwt/refresh/";

// =============================================================================
// Transport
// =============================================================================

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the API base URL (e.g. `/carts/my_cart/`).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Full `Authorization` header value, when the request is authenticated.
    pub authorization: Option<String>,
}

/// Raw result of a transport send: HTTP status and body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Errors below the HTTP layer: the request never produced a status code.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// The configured request timeout elapsed.
    #[error("request timed out")]
    Timeout,
}

/// The network seam. One call in, one status + body out.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return its response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was obtained; every
    /// received status code, including errors, is a successful send.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] implementation over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url).query(&request.query);

        if let Some(authorization) = &request.authorization {
            builder = builder.header("Authorization", authorization);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when calling the Tunda API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never reached a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the server rejected the request as unauthenticated.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// The backend's human-readable `detail` message, when the error body
    /// carries one.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("detail")?.as_str().map(str::to_owned)
    }
}

// =============================================================================
// Request builder
// =============================================================================

/// An API call before authentication concerns are applied.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub(crate) fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(crate) fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    fn to_transport(&self, authorization: Option<String>) -> TransportRequest {
        TransportRequest {
            method: self.method,
            path: self.path.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
            authorization,
        }
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// The single HTTP client every typed wrapper goes through.
///
/// Cheap to clone; all clones share the transport and token store.
#[derive(Clone)]
pub struct ApiGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    events: EventBus,
}

impl ApiGateway {
    /// Create a gateway over an arbitrary transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, tokens: TokenStore, events: EventBus) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                tokens,
                events,
            }),
        }
    }

    /// Execute a request and decode its JSON response.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(&request).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        // 204-style responses have no body; decode them as JSON null so
        // callers expecting `Value` or `Option<_>` still succeed.
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };

        serde_json::from_str(body).map_err(ApiError::Parse)
    }

    /// Send once with the stored access token; recover a 401 at most once.
    async fn dispatch(&self, request: &ApiRequest) -> Result<TransportResponse, ApiError> {
        let access = self.inner.tokens.access_token();
        let response = self.send(request, access.as_deref()).await?;

        if response.status != 401 {
            return Ok(response);
        }

        self.recover_unauthorized(request, response).await
    }

    /// The refresh-and-retry path. The retried request's outcome is returned
    /// verbatim: a second 401 goes back to the caller, never into another
    /// refresh.
    async fn recover_unauthorized(
        &self,
        request: &ApiRequest,
        original: TransportResponse,
    ) -> Result<TransportResponse, ApiError> {
        let Some(refresh_token) = self.inner.tokens.refresh_token() else {
            // Nothing stored to recover with, and nothing to clear.
            self.inner.events.emit(ClientEvent::SessionExpired);
            return Ok(original);
        };

        tracing::debug!(method = %request.method, path = %request.path, "access token rejected, refreshing");

        match self.refresh_access(&refresh_token).await {
            Ok(access) => {
                if let Err(err) = self.inner.tokens.store_access(&access) {
                    tracing::warn!(error = %err, "failed to persist refreshed access token");
                }
                self.send(request, Some(&access)).await.map_err(Into::into)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, session terminated");
                self.inner.tokens.clear();
                self.inner.events.emit(ClientEvent::SessionExpired);
                Err(err)
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    async fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request =
            ApiRequest::post(REFRESH_PATH).json(serde_json::json!({ "refresh": refresh_token }));

        // Deliberately unauthenticated and outside `dispatch`: a failing
        // refresh must never trigger another refresh.
        let response = self.send(&request, None).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let refreshed: types::RefreshedAccess = serde_json::from_str(&response.body)?;
        Ok(refreshed.access)
    }

    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        let authorization = access_token.map(|token| format!("{AUTH_SCHEME} {token}"));
        self.inner
            .transport
            .send(request.to_transport(authorization))
            .await
    }
}
