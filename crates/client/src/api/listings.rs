//! Produce listing endpoints.
//!
//! Listings are read-heavy and change slowly, so single-listing fetches are
//! cached in memory with a 5-minute TTL. List queries go to the network every
//! time; their filter combinations make caching a poor trade.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;
use tunda_core::{FarmId, ListingId};

use super::types::{ListingSummary, Page};
use super::{ApiError, ApiGateway, ApiRequest};

/// Cache tuning: listings change on the order of minutes, not milliseconds.
const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Filters accepted by the listings index.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Page number (1-based).
    pub page: Option<u32>,
    /// Free-text product search.
    pub search: Option<String>,
    /// Restrict to one farm's listings.
    pub farm_id: Option<FarmId>,
}

/// Typed wrapper for the `products/listings` endpoints.
#[derive(Clone)]
pub struct ListingApi {
    inner: Arc<ListingApiInner>,
}

struct ListingApiInner {
    gateway: ApiGateway,
    cache: Cache<ListingId, ListingSummary>,
}

impl ListingApi {
    /// Create the wrapper over a gateway.
    #[must_use]
    pub fn new(gateway: ApiGateway) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ListingApiInner { gateway, cache }),
        }
    }

    /// Fetch a page of listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListingQuery) -> Result<Page<ListingSummary>, ApiError> {
        let mut request = ApiRequest::get("/products/listings/");
        if let Some(page) = query.page {
            request = request.query("page", page);
        }
        if let Some(search) = &query.search {
            request = request.query("search", search);
        }
        if let Some(farm_id) = query.farm_id {
            request = request.query("farm_id", farm_id);
        }

        let page: Page<ListingSummary> = self.inner.gateway.execute(request).await?;

        // Feed the single-listing cache from whatever came back.
        for listing in &page.results {
            self.inner
                .cache
                .insert(listing.listing_id, listing.clone())
                .await;
        }

        Ok(page)
    }

    /// Fetch one listing, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, listing_id: ListingId) -> Result<ListingSummary, ApiError> {
        if let Some(cached) = self.inner.cache.get(&listing_id).await {
            return Ok(cached);
        }

        let listing: ListingSummary = self
            .inner
            .gateway
            .execute(ApiRequest::get(format!("/products/listings/{listing_id}/")))
            .await?;

        self.inner.cache.insert(listing_id, listing.clone()).await;
        Ok(listing)
    }
}
