//! User roles.

use serde::{Deserialize, Serialize};

/// Role a marketplace account acts under.
///
/// Every account has exactly one role; the backend serializes it as a
/// lowercase string in the `user_role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Buys produce and owns a server-side cart.
    Customer,
    /// Lists produce from one or more farms.
    Farmer,
    /// Delivers orders.
    Rider,
    /// Platform administration.
    Admin,
}

impl UserRole {
    /// Human-readable role name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Farmer => "Farmer",
            Self::Rider => "Rider",
            Self::Admin => "Administrator",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Farmer => write!(f, "farmer"),
            Self::Rider => write!(f, "rider"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "farmer" => Ok(Self::Farmer),
            "rider" => Ok(Self::Rider),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
