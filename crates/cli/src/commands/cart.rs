//! Cart commands.
//!
//! Which cart a command touches depends on the session: an authenticated
//! customer works against the server cart, everyone else against the durable
//! guest cart - the same rule the web front end applies.

use rust_decimal::Decimal;
use tunda_client::TundaClient;
use tunda_core::{CartItemId, ListingId};

use super::CommandError;

fn uses_server_cart(client: &TundaClient) -> bool {
    client.session().is_customer()
}

/// Show the cart's lines and totals.
pub async fn show(client: &TundaClient) -> Result<(), CommandError> {
    if uses_server_cart(client) {
        let cart = client.server_cart().my_cart().await?;
        if cart.items.is_empty() {
            tracing::info!("Your cart is empty");
            return Ok(());
        }
        for item in &cart.items {
            tracing::info!(
                "#{} {} x {} @ {}",
                item.cart_item_id,
                item.product_name.as_deref().unwrap_or("(listing)"),
                item.quantity,
                item.price_at_addition,
            );
        }
        if let Some(total) = cart.total_cost {
            tracing::info!("Total: KSh {total}");
        }
    } else {
        let items = client.guest_cart().items();
        if items.is_empty() {
            tracing::info!("Your guest cart is empty");
            return Ok(());
        }
        for item in &items {
            tracing::info!(
                "#{} {} ({}) x {} {} @ {}",
                item.listing_id,
                item.product_name,
                item.farm_name,
                item.quantity,
                item.unit,
                item.unit_price,
            );
        }
        tracing::info!("Total: KSh {}", client.guest_cart().total());
    }
    Ok(())
}

/// Add a listing to whichever cart the session uses.
///
/// The listing is fetched first so a guest line captures its display
/// snapshot; the quantity defaults to the listing's minimum order.
pub async fn add(
    client: &TundaClient,
    listing_id: i32,
    quantity: Option<Decimal>,
) -> Result<(), CommandError> {
    let listing = client.listings().get(ListingId::new(listing_id)).await?;
    let quantity = quantity.unwrap_or(listing.min_order_quantity);

    if uses_server_cart(client) {
        client.server_cart().add_item(listing.listing_id, quantity).await?;
    } else {
        client.guest_cart().add(&listing, quantity)?;
    }

    tracing::info!(
        "Added {} x {} {} to your cart",
        listing.product.product_name,
        quantity,
        listing.product.unit_of_measure,
    );
    Ok(())
}

/// Replace a line's quantity.
pub async fn update(
    client: &TundaClient,
    item_id: i32,
    quantity: Decimal,
) -> Result<(), CommandError> {
    if uses_server_cart(client) {
        client
            .server_cart()
            .update_quantity(CartItemId::new(item_id), quantity)
            .await?;
        tracing::info!("Updated cart item #{item_id} to {quantity}");
    } else if client
        .guest_cart()
        .update_quantity(ListingId::new(item_id), quantity)?
    {
        tracing::info!("Updated listing #{item_id} to {quantity}");
    } else {
        tracing::warn!("Listing #{item_id} is not in your guest cart");
    }
    Ok(())
}

/// Remove a line.
pub async fn remove(client: &TundaClient, item_id: i32) -> Result<(), CommandError> {
    if uses_server_cart(client) {
        client.server_cart().remove_item(CartItemId::new(item_id)).await?;
    } else {
        client.guest_cart().remove(ListingId::new(item_id))?;
    }
    tracing::info!("Removed #{item_id} from your cart");
    Ok(())
}

/// Empty the cart.
pub async fn clear(client: &TundaClient) -> Result<(), CommandError> {
    if uses_server_cart(client) {
        client.server_cart().clear_cart().await?;
    } else {
        client.guest_cart().clear()?;
    }
    tracing::info!("Cart cleared");
    Ok(())
}
