//! Tunda Client - marketplace session and cart library.
//!
//! This crate is the client core of the Tunda farm-to-consumer marketplace.
//! It owns the pieces every front end needs to get right:
//!
//! - [`api`] - HTTP gateway with bearer-token attach and a single transparent
//!   refresh-and-retry on 401, plus typed wrappers for the auth, cart and
//!   listing endpoints
//! - [`session`] - session/identity manager: initialization from stored
//!   tokens, login, registration, logout, role predicates
//! - [`cart`] - durable guest cart for anonymous shoppers and the
//!   reconciliation protocol that merges it into the server cart on login
//! - [`storage`] - the durable key-value store backing tokens and the guest
//!   cart (file-backed by default, in-memory for tests)
//! - [`events`] - broadcast signals (`CartChanged`, `SessionExpired`) that
//!   decouple the core from whatever UI observes it
//!
//! # Example
//!
//! ```rust,ignore
//! use tunda_client::{ClientConfig, TundaClient};
//!
//! let config = ClientConfig::from_env()?;
//! let client = TundaClient::new(&config)?;
//!
//! // Browse anonymously, cart kept in durable local storage
//! let listing = client.listings().get(42.into()).await?;
//! client.guest_cart().add(&listing, listing.min_order_quantity)?;
//!
//! // Logging in as a customer merges the guest cart into the server cart
//! let outcome = client.session().login(&phone, &password).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod client;
pub mod config;
pub mod events;
pub mod session;
pub mod storage;

pub use api::types::{
    ListingProduct, ListingStatus, ListingSummary, MergeItem, NewUser, Page, ProfileUpdate,
    ServerCart, ServerCartItem, TokenPair, UserProfile,
};
pub use api::{
    ApiError, AuthApi, CartApi, HttpTransport, ListingApi, ListingQuery, Method, Transport,
    TransportError, TransportRequest, TransportResponse,
};
pub use cart::{GuestCart, GuestCartItem};
pub use client::{ClientError, TundaClient};
pub use config::{ClientConfig, ConfigError};
pub use events::{ClientEvent, EventBus};
pub use session::{Outcome, RegisterOutcome, SessionManager, SessionState};
pub use storage::{FileStore, MemoryStore, Storage, StorageError, TokenStore};
