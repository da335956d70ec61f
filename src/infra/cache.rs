//! Session-scoped memoization of cheapest-listings queries.
//!
//! One cache lives for exactly one search session. Keys are the full
//! `(item, location, amount, hq)` tuple; a resolved entry is never re-fetched
//! for the same key (no TTL within a session). Concurrent resolvers of the
//! same key share a single in-flight fetch through a cloned shared future,
//! so a burst of recomputations cannot cause a request storm.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use log::{trace, warn};
use tokio::sync::Mutex;

use crate::domain::{Listing, ListingKey, MarketProvider};

type SharedFetch = Shared<BoxFuture<'static, Option<Vec<Listing>>>>;

pub struct ListingCache {
    provider: Arc<dyn MarketProvider>,
    resolved: Arc<RwLock<HashMap<ListingKey, Vec<Listing>>>>,
    in_flight: Arc<Mutex<HashMap<ListingKey, SharedFetch>>>,
}

impl ListingCache {
    pub fn new(provider: Arc<dyn MarketProvider>) -> Self {
        Self {
            provider,
            resolved: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Already-resolved listings for a key, without triggering a fetch.
    pub fn cached(&self, key: &ListingKey) -> Option<Vec<Listing>> {
        let store = self.resolved.read().unwrap();
        let hit = store.get(key).cloned();
        if hit.is_some() {
            trace!("cache hit: {key}");
        }
        hit
    }

    /// Resolve listings for a key, fetching at most once per key at a time.
    ///
    /// Returns `None` when the fetch failed; the entry stays unresolved and a
    /// later call may retry. Successful results are stored add-if-absent, so
    /// interleaved completions cannot overwrite each other.
    pub async fn resolve(&self, key: &ListingKey) -> Option<Vec<Listing>> {
        if let Some(listings) = self.cached(key) {
            return Some(listings);
        }

        let (fetch, owner) = {
            let mut running = self.in_flight.lock().await;
            if let Some(existing) = running.get(key) {
                trace!("joining in-flight fetch: {key}");
                (existing.clone(), false)
            } else if let Some(listings) = self.cached(key) {
                // Lost the race to a fetch that completed while we waited.
                return Some(listings);
            } else {
                trace!("cache miss, fetching: {key}");
                let provider = Arc::clone(&self.provider);
                let resolved = Arc::clone(&self.resolved);
                let fetch_key = key.clone();
                let fetch = async move {
                    match provider.cheapest_listings(&fetch_key).await {
                        Ok(listings) => {
                            resolved
                                .write()
                                .unwrap()
                                .entry(fetch_key)
                                .or_insert_with(|| listings.clone());
                            Some(listings)
                        }
                        Err(error) => {
                            warn!("listing fetch failed for {fetch_key}: {error}");
                            None
                        }
                    }
                }
                .boxed()
                .shared();
                running.insert(key.clone(), fetch.clone());
                (fetch, true)
            }
        };

        let result = fetch.await;
        if owner {
            self.in_flight.lock().await.remove(key);
        }
        result
    }
}
