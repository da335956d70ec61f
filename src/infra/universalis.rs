//! Thin asynchronous client for the Universalis market board API v2.
//!
//! - Typed accessors for current listings, sale prices and world metadata.
//! - Applies the HQ preference filter, falling back to any quality when HQ
//!   supply alone cannot cover the requested amount.

use async_trait::async_trait;
use log::trace;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};

use crate::domain::{
    DataCenter, ItemId, Listing, ListingKey, MarketError, MarketProvider, World, WorldId,
};

const DEFAULT_BASE_URL: &str = "https://universalis.app/api/v2/";
const USER_AGENT: &str = "craft-profit-scanner/0.1.0";

/// The API returns 10 listings unless told otherwise; ask for at least that.
const MIN_LISTING_ENTRIES: u32 = 10;
const MAX_LISTING_ENTRIES: u32 = 100;

#[derive(Clone)]
pub struct UniversalisClient {
    http: Client,
    base_url: Url,
}

impl UniversalisClient {
    pub fn new() -> Result<Self, MarketError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, MarketError> {
        // Url::join drops the last path segment without a trailing slash.
        let base_url = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    /// Current listings for one item at one location token.
    pub async fn current_listings(
        &self,
        location: &str,
        item_id: ItemId,
        entries: u32,
    ) -> Result<Vec<Listing>, MarketError> {
        trace!("getting universalis data for {item_id} @ {location}");
        let url = self.url(&format!("{location}/{item_id}"))?;
        let dto: MarketBoardCurrentDto = self
            .fetch(self.http.get(url).query(&[("entries", entries)]))
            .await?;
        Ok(dto.into_listings())
    }

    /// All datacenters with their regions and member worlds.
    pub async fn data_centers(&self) -> Result<Vec<DataCenter>, MarketError> {
        let url = self.url("data-centers")?;
        self.fetch(self.http.get(url)).await
    }

    /// All worlds.
    pub async fn worlds(&self) -> Result<Vec<World>, MarketError> {
        let url = self.url("worlds")?;
        self.fetch(self.http.get(url)).await
    }

    async fn fetch<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, MarketError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl MarketProvider for UniversalisClient {
    async fn cheapest_listings(&self, key: &ListingKey) -> Result<Vec<Listing>, MarketError> {
        let entries = key.amount.clamp(MIN_LISTING_ENTRIES, MAX_LISTING_ENTRIES);
        let listings = self
            .current_listings(&key.location, key.item_id, entries)
            .await?;
        if !key.hq {
            return Ok(listings);
        }

        // HQ is a preference, not a hard requirement: when HQ supply alone
        // cannot cover the amount, any-quality listings are better than a
        // guaranteed shortfall.
        let hq_only: Vec<Listing> = listings.iter().filter(|l| l.hq).cloned().collect();
        let hq_supply: u32 = hq_only.iter().map(|l| l.quantity).sum();
        if hq_supply >= key.amount {
            Ok(hq_only)
        } else {
            trace!("HQ supply {hq_supply} cannot cover {key}, using any quality");
            Ok(listings)
        }
    }

    async fn current_sale_price(
        &self,
        item_id: ItemId,
        location: &str,
    ) -> Result<Option<f64>, MarketError> {
        let listings = self
            .current_listings(location, item_id, MIN_LISTING_ENTRIES)
            .await?;
        Ok(listings
            .iter()
            .map(|l| l.price_per_unit)
            .min_by(|a, b| a.total_cmp(b)))
    }
}

// Response from GET {base}/{location}/{item}. `worldID` sits at the top level
// for single-world queries and on each listing for datacenter/region queries.
#[derive(Debug, Deserialize)]
struct MarketBoardCurrentDto {
    #[serde(rename = "itemID")]
    item_id: ItemId,
    #[serde(rename = "worldID", default)]
    world_id: Option<WorldId>,
    #[serde(default)]
    listings: Vec<MarketBoardListingDto>,
}

#[derive(Debug, Deserialize)]
struct MarketBoardListingDto {
    #[serde(rename = "worldID", default)]
    world_id: Option<WorldId>,
    #[serde(rename = "pricePerUnit")]
    price_per_unit: f64,
    quantity: u32,
    hq: bool,
    #[serde(rename = "retainerName")]
    retainer_name: String,
    total: u64,
}

impl MarketBoardCurrentDto {
    fn into_listings(self) -> Vec<Listing> {
        let item_id = self.item_id;
        let query_world = self.world_id;
        self.listings
            .into_iter()
            .filter_map(|dto| {
                let world_id = dto.world_id.or(query_world)?;
                Some(Listing {
                    item_id,
                    world_id,
                    price_per_unit: dto.price_per_unit,
                    quantity: dto.quantity,
                    total_price: dto.total,
                    hq: dto.hq,
                    retainer_name: dto.retainer_name,
                })
            })
            .collect()
    }
}
