//! Server-side cart endpoints.
//!
//! These operate on the authenticated customer's cart. Every successful
//! mutation emits [`ClientEvent::CartChanged`] so views refresh; the merge
//! endpoint is the one exception, because the reconciliation protocol's
//! follow-up guest-cart clear is the single signal for the whole merge.

use rust_decimal::Decimal;
use tracing::instrument;
use tunda_core::{CartItemId, ListingId};

use super::types::{MergeItem, ServerCart};
use super::{ApiError, ApiGateway, ApiRequest};
use crate::events::{ClientEvent, EventBus};

/// Typed wrapper for the `carts` endpoints.
#[derive(Clone)]
pub struct CartApi {
    gateway: ApiGateway,
    events: EventBus,
}

impl CartApi {
    /// Create the wrapper over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway, events: EventBus) -> Self {
        Self { gateway, events }
    }

    /// Fetch the customer's cart, creating it server-side if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the request fails.
    #[instrument(skip(self))]
    pub async fn my_cart(&self) -> Result<ServerCart, ApiError> {
        self.gateway.execute(ApiRequest::get("/carts/my_cart/")).await
    }

    /// Add a listing to the cart, or top up its quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is unavailable, the quantity is
    /// rejected, or the request fails.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        listing_id: ListingId,
        quantity: Decimal,
    ) -> Result<ServerCart, ApiError> {
        let request = ApiRequest::post("/carts/add_item/").json(serde_json::json!({
            "listing_id": listing_id,
            "quantity": quantity,
        }));
        let cart = self.gateway.execute(request).await?;
        self.events.emit(ClientEvent::CartChanged);
        Ok(cart)
    }

    /// Replace a line's quantity. The server removes the line when the
    /// quantity is zero or negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        cart_item_id: CartItemId,
        quantity: Decimal,
    ) -> Result<ServerCart, ApiError> {
        let request = ApiRequest::post("/carts/update_quantity/").json(serde_json::json!({
            "cart_item_id": cart_item_id,
            "quantity": quantity,
        }));
        let cart = self.gateway.execute(request).await?;
        self.events.emit(ClientEvent::CartChanged);
        Ok(cart)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, cart_item_id: CartItemId) -> Result<ServerCart, ApiError> {
        let request = ApiRequest::post("/carts/remove_item/").json(serde_json::json!({
            "cart_item_id": cart_item_id,
        }));
        let cart = self.gateway.execute(request).await?;
        self.events.emit(ClientEvent::CartChanged);
        Ok(cart)
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<ServerCart, ApiError> {
        let cart = self
            .gateway
            .execute(ApiRequest::post("/carts/clear_cart/"))
            .await?;
        self.events.emit(ClientEvent::CartChanged);
        Ok(cart)
    }

    /// Merge a guest-cart snapshot into the server cart in a single call.
    ///
    /// The endpoint upserts by `listing_id`, adding quantities to existing
    /// lines, so re-sending the same snapshot after a transient failure does
    /// not duplicate lines. Emits no event; the caller clears the guest cart
    /// on success and that clear is the cart-changed signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the request fails.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn merge_guest_cart(&self, items: &[MergeItem]) -> Result<ServerCart, ApiError> {
        let request = ApiRequest::post("/carts/merge_guest_cart/").json(serde_json::json!({
            "items": items,
        }));
        self.gateway.execute(request).await
    }
}
