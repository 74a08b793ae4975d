//! Wire types for the Tunda REST API.
//!
//! Shapes mirror the backend's serializers. Unknown fields are ignored on
//! deserialization, so additive backend changes don't break the client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tunda_core::{CartId, CartItemId, FarmId, ListingId, PhoneNumber, ProductId, UnitOfMeasure, UserId, UserRole};

/// Access and refresh tokens issued at session creation.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}

/// Response of the token refresh endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshedAccess {
    pub access: String,
}

/// The authenticated account's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub phone_number: PhoneNumber,
    #[serde(default)]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub user_role: UserRole,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

impl UserProfile {
    /// First and last name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// Payload for account registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub phone_number: PhoneNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub user_role: UserRole,
}

/// Partial profile update; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

/// Paginated list envelope used by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Availability state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    PreOrder,
    SoldOut,
    Inactive,
}

/// The product a listing sells, nested inside the listing payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingProduct {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_of_measure: UnitOfMeasure,
}

/// A produce listing as returned by the listings endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub listing_id: ListingId,
    pub farm: FarmId,
    pub farm_name: String,
    pub product: ListingProduct,
    pub current_price: Decimal,
    pub quantity_available: Decimal,
    pub min_order_quantity: Decimal,
    pub listing_status: ListingStatus,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// A line of the authenticated customer's server-side cart.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerCartItem {
    pub cart_item_id: CartItemId,
    /// Listing the line refers to.
    pub listing: ListingId,
    pub quantity: Decimal,
    /// Unit price captured when the line was created.
    pub price_at_addition: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub farm_name: Option<String>,
    /// True when the listing price moved since the line was created.
    #[serde(default)]
    pub price_changed: bool,
}

/// The authenticated customer's server-side cart.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerCart {
    pub cart_id: CartId,
    #[serde(default)]
    pub items: Vec<ServerCartItem>,
    /// Sum of all line quantities.
    #[serde(default)]
    pub total_items: Option<Decimal>,
    /// Sum of all line subtotals.
    #[serde(default)]
    pub total_cost: Option<Decimal>,
}

/// One guest-cart line in the merge payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeItem {
    pub listing_id: ListingId,
    pub quantity: Decimal,
}
