//! Listing browse command.

use tunda_client::{ListingQuery, TundaClient};

use super::CommandError;

/// Print a page of listings.
pub async fn browse(
    client: &TundaClient,
    page: Option<u32>,
    search: Option<String>,
) -> Result<(), CommandError> {
    let query = ListingQuery {
        page,
        search,
        farm_id: None,
    };

    let listings = client.listings().list(&query).await?;

    if listings.results.is_empty() {
        tracing::info!("No listings found");
        return Ok(());
    }

    for listing in &listings.results {
        tracing::info!(
            "#{} {} - {} | KSh {} / {} | {} available (min {})",
            listing.listing_id,
            listing.product.product_name,
            listing.farm_name,
            listing.current_price,
            listing.product.unit_of_measure,
            listing.quantity_available,
            listing.min_order_quantity,
        );
    }

    tracing::info!(
        "Showing {} of {} listing(s)",
        listings.results.len(),
        listings.count
    );
    Ok(())
}
