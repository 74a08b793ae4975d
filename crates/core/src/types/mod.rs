//! Core types for the Tunda marketplace client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod price;
pub mod role;
pub mod unit;

pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::{CurrencyCode, Price};
pub use role::UserRole;
pub use unit::UnitOfMeasure;
