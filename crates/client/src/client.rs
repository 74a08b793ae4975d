//! Assembled client facade.
//!
//! [`TundaClient`] wires the storage, event bus, gateway, typed APIs, guest
//! cart and session manager together so embedders construct one object. The
//! parts stay individually constructible for tests and for embedders with
//! their own wiring.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiGateway, AuthApi, CartApi, HttpTransport, ListingApi, Transport};
use crate::cart::GuestCart;
use crate::config::ClientConfig;
use crate::events::EventBus;
use crate::session::SessionManager;
use crate::storage::{FileStore, Storage, StorageError, TokenStore};

/// Errors that can occur while assembling a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The durable storage file could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The HTTP transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[from] crate::api::TransportError),
}

/// The assembled Tunda client.
///
/// Cheap to clone; clones share all state. One instance per application (or
/// per test) - there are no process-level globals anywhere in the crate.
#[derive(Clone)]
pub struct TundaClient {
    inner: Arc<TundaClientInner>,
}

struct TundaClientInner {
    events: EventBus,
    session: SessionManager,
    guest_cart: GuestCart,
    listings: ListingApi,
    carts: CartApi,
}

impl TundaClient {
    /// Build a client from configuration: file-backed storage at the
    /// configured path and a real HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file or HTTP client cannot be set up.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStore::open(&config.storage_path)?);
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_parts(transport, storage))
    }

    /// Build a client over explicit transport and storage backends.
    ///
    /// This is the test seam: a scripted transport plus an in-memory store
    /// makes every session and cart flow reproducible offline.
    #[must_use]
    pub fn with_parts(transport: Arc<dyn Transport>, storage: Arc<dyn Storage>) -> Self {
        let events = EventBus::new();
        let tokens = TokenStore::new(storage.clone());
        let gateway = ApiGateway::new(transport, tokens.clone(), events.clone());

        let auth = AuthApi::new(gateway.clone());
        let carts = CartApi::new(gateway.clone(), events.clone());
        let listings = ListingApi::new(gateway);
        let guest_cart = GuestCart::load(storage, events.clone());
        let session = SessionManager::new(auth, carts.clone(), tokens, guest_cart.clone());

        Self {
            inner: Arc::new(TundaClientInner {
                events,
                session,
                guest_cart,
                listings,
                carts,
            }),
        }
    }

    /// The session/identity manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// The anonymous shopper's durable cart.
    #[must_use]
    pub fn guest_cart(&self) -> &GuestCart {
        &self.inner.guest_cart
    }

    /// The authenticated customer's server-side cart endpoints.
    #[must_use]
    pub fn server_cart(&self) -> &CartApi {
        &self.inner.carts
    }

    /// The produce listing endpoints.
    #[must_use]
    pub fn listings(&self) -> &ListingApi {
        &self.inner.listings
    }

    /// The broadcast bus carrying cart-changed and session-expired signals.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}
