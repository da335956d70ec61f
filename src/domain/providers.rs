//! Contracts for the out-of-scope collaborators the core calls into.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ItemId, Listing, ListingKey};

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

/// Source of market-board data.
///
/// `cheapest_listings` is amount-bounded: it returns enough listings to
/// plausibly cover `key.amount`, in no guaranteed order. Implementations
/// should be shareable (`Arc<dyn MarketProvider>`) so one client backs many
/// concurrent ingredient fetches.
#[async_trait]
pub trait MarketProvider: Send + Sync {
    async fn cheapest_listings(&self, key: &ListingKey) -> Result<Vec<Listing>, MarketError>;

    /// Current sale price of an item at a location, if it has any listings.
    async fn current_sale_price(
        &self,
        item_id: ItemId,
        location: &str,
    ) -> Result<Option<f64>, MarketError>;
}
