//! Guest-to-server cart reconciliation.
//!
//! Runs whenever a session becomes an authenticated customer while the guest
//! cart holds lines: the whole snapshot goes to the merge endpoint in one
//! call, and only a confirmed merge clears the local cart. A failed merge
//! leaves every line in place; the next qualifying login retries naturally,
//! and the endpoint's upsert-by-listing contract keeps the retry harmless.

use crate::api::types::MergeItem;
use crate::api::{ApiError, CartApi};
use crate::cart::GuestCart;

/// Merge the guest cart into the authenticated customer's server cart.
///
/// No-op for an empty guest cart. On success the guest cart is cleared,
/// which also emits the single cart-changed signal for the merge. On failure
/// the guest cart is untouched and the error is returned for logging;
/// nothing retries automatically.
///
/// # Errors
///
/// Returns an error if the merge call fails. The guest cart is preserved.
pub async fn reconcile(carts: &CartApi, guest_cart: &GuestCart) -> Result<(), ApiError> {
    let items: Vec<MergeItem> = guest_cart
        .items()
        .into_iter()
        .map(|item| MergeItem {
            listing_id: item.listing_id,
            quantity: item.quantity,
        })
        .collect();

    if items.is_empty() {
        return Ok(());
    }

    tracing::info!(item_count = items.len(), "merging guest cart into server cart");
    carts.merge_guest_cart(&items).await?;

    if let Err(err) = guest_cart.clear() {
        // The server now owns the lines; a failed local clear only risks a
        // re-merge, which the upsert contract absorbs.
        tracing::warn!(error = %err, "merged guest cart could not be cleared locally");
    }

    Ok(())
}
