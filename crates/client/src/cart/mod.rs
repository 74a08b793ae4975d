//! Guest cart for anonymous shoppers.
//!
//! Anyone who is not an authenticated customer shops into this cart. It lives
//! entirely in durable client-side storage, keyed by listing, and survives
//! logout by design: an anonymous cart on a shared device must outlive
//! whatever session happens to end on it. It is emptied only by an explicit
//! [`GuestCart::clear`] or by a successful merge into the server cart.

pub mod merge;

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tunda_core::{ListingId, UnitOfMeasure};

use crate::api::types::ListingSummary;
use crate::events::{ClientEvent, EventBus};
use crate::storage::{Storage, StorageError};

/// Storage key for the serialized guest cart.
pub const GUEST_CART_KEY: &str = "guest_cart";

/// One guest-cart line: the ordered quantity plus a display snapshot of the
/// listing taken when the line was created.
///
/// Identity is `listing_id` alone; the cart never holds two lines for the
/// same listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartItem {
    pub listing_id: ListingId,
    pub quantity: Decimal,
    pub product_name: String,
    pub farm_name: String,
    pub unit_price: Decimal,
    pub unit: UnitOfMeasure,
    pub min_order_quantity: Decimal,
    pub available_quantity: Decimal,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl GuestCartItem {
    /// Build a line from a listing snapshot.
    #[must_use]
    pub fn from_listing(listing: &ListingSummary, quantity: Decimal) -> Self {
        Self {
            listing_id: listing.listing_id,
            quantity,
            product_name: listing.product.product_name.clone(),
            farm_name: listing.farm_name.clone(),
            unit_price: listing.current_price,
            unit: listing.product.unit_of_measure,
            min_order_quantity: listing.min_order_quantity,
            available_quantity: listing.quantity_available,
            photos: listing.photos.clone(),
        }
    }

    /// Line subtotal at the snapshotted unit price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// The anonymous shopper's cart.
///
/// All operations are synchronous and write-through: the full collection is
/// persisted before a mutating call returns, so a reload never loses a
/// mutation the caller already observed. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct GuestCart {
    inner: Arc<GuestCartInner>,
}

struct GuestCartInner {
    storage: Arc<dyn Storage>,
    events: EventBus,
    items: Mutex<Vec<GuestCartItem>>,
}

impl GuestCart {
    /// Load the cart from storage.
    ///
    /// A missing snapshot yields an empty cart; a corrupt one is discarded
    /// with a warning rather than failing initialization.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, events: EventBus) -> Self {
        let items = match storage.get(GUEST_CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(error = %err, "corrupt guest cart snapshot, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read guest cart snapshot, starting empty");
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(GuestCartInner {
                storage,
                events,
                items: Mutex::new(items),
            }),
        }
    }

    /// Add `quantity` of a listing.
    ///
    /// If the listing is already in the cart its quantity is increased, never
    /// duplicated into a second line; otherwise a new line captures the
    /// listing's display snapshot. `quantity` must be positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be persisted; the
    /// in-memory cart is left unchanged in that case.
    pub fn add(&self, listing: &ListingSummary, quantity: Decimal) -> Result<(), StorageError> {
        self.mutate(|items| {
            match items
                .iter_mut()
                .find(|item| item.listing_id == listing.listing_id)
            {
                Some(existing) => existing.quantity += quantity,
                None => items.push(GuestCartItem::from_listing(listing, quantity)),
            }
            true
        })
    }

    /// Replace the quantity of an existing line.
    ///
    /// Returns `false` without touching storage when the listing is not in
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be persisted.
    pub fn update_quantity(
        &self,
        listing_id: ListingId,
        quantity: Decimal,
    ) -> Result<bool, StorageError> {
        let mut found = false;
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.listing_id == listing_id) {
                item.quantity = quantity;
                found = true;
            }
            found
        })?;
        Ok(found)
    }

    /// Remove a line; absent listings are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be persisted.
    pub fn remove(&self, listing_id: ListingId) -> Result<(), StorageError> {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|item| item.listing_id != listing_id);
            items.len() != before
        })
    }

    /// Empty the cart and persist the empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty cart cannot be persisted.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|items| {
            if items.is_empty() {
                return false;
            }
            items.clear();
            true
        })
    }

    /// Snapshot of the current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<GuestCartItem> {
        self.lock().clone()
    }

    /// True when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().iter().map(GuestCartItem::subtotal).sum()
    }

    /// Apply a mutation, persist the result, then commit it to memory and
    /// emit the cart-changed signal. The mutation callback returns whether
    /// anything actually changed; unchanged carts skip the write and signal.
    fn mutate(
        &self,
        apply: impl FnOnce(&mut Vec<GuestCartItem>) -> bool,
    ) -> Result<(), StorageError> {
        let mut items = self
            .inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut updated = items.clone();
        if !apply(&mut updated) {
            return Ok(());
        }

        let serialized = serde_json::to_string(&updated)?;
        self.inner.storage.set(GUEST_CART_KEY, &serialized)?;

        *items = updated;
        drop(items);

        self.inner.events.emit(ClientEvent::CartChanged);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GuestCartItem>> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
