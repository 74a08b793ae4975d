//! Tunda Core - Shared types library.
//!
//! This crate provides common types used across the Tunda client components:
//! - `client` - Session, cart and API client library
//! - `cli` - Command-line tool driving the client end to end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, phone numbers,
//!   roles and units

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
