//! One market search session: concurrent per-ingredient fetches folded into a
//! stream of immutable recipe cost snapshots.
//!
//! The session owns the listing cache, which makes the cache lifetime
//! explicit: create a session per search, drop it when the criteria change.
//! Fetches belonging to a superseded search are not cancelled; their results
//! land in that session's cache under their original keys and simply go
//! unread.

use std::sync::Arc;

use log::debug;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{
    allocate, IngredientCostTracker, IngredientEvent, ListingKey, MarketProvider, Recipe,
    RecipeCostSnapshot, SearchCriteria,
};
use crate::infra::ListingCache;

/// Craft quantities accepted at the boundary.
const MAX_CRAFT_QUANTITY: u32 = 1000;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("craft quantity must be between 1 and {MAX_CRAFT_QUANTITY}, got {0}")]
    InvalidQuantity(u32),
    #[error("recipe {0} has no ingredients")]
    EmptyRecipe(u32),
}

pub struct SearchSession {
    cache: Arc<ListingCache>,
}

impl SearchSession {
    pub fn new(provider: Arc<dyn MarketProvider>) -> Self {
        Self {
            cache: Arc::new(ListingCache::new(provider)),
        }
    }

    /// Start pricing one recipe under the given criteria.
    ///
    /// Returns a receiver of successive snapshots: an initial all-pending one,
    /// then one per fetch completion, in completion order. The channel closes
    /// once every ingredient has reached a terminal state. Each snapshot is at
    /// least as complete as the one before it; totals only grow.
    pub fn plan(
        &self,
        recipe: &Recipe,
        criteria: &SearchCriteria,
        sale_price: Option<f64>,
    ) -> Result<mpsc::Receiver<RecipeCostSnapshot>, PlanError> {
        if criteria.craft_quantity < 1 || criteria.craft_quantity > MAX_CRAFT_QUANTITY {
            return Err(PlanError::InvalidQuantity(criteria.craft_quantity));
        }
        if recipe.ingredients.is_empty() {
            return Err(PlanError::EmptyRecipe(recipe.id));
        }
        debug!(
            "pricing recipe {} x{} @ {} (hq: {})",
            recipe.id, criteria.craft_quantity, criteria.location, criteria.hq
        );

        let mut tracker = IngredientCostTracker::new(recipe, criteria, sale_price);
        let ingredient_count = recipe.ingredients.len();
        let (event_tx, mut event_rx) = mpsc::channel::<IngredientEvent>(ingredient_count);
        let (snapshot_tx, snapshot_rx) =
            mpsc::channel::<RecipeCostSnapshot>(ingredient_count + 1);

        for requirement in &recipe.ingredients {
            let key = ListingKey {
                item_id: requirement.item_id,
                location: criteria.location.clone(),
                amount: requirement.scaled(criteria.craft_quantity),
                hq: criteria.hq,
            };
            let cache = Arc::clone(&self.cache);
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let event = match cache.resolve(&key).await {
                    Some(listings) => IngredientEvent::Resolved {
                        item_id: key.item_id,
                        allocation: allocate(&listings, key.amount),
                    },
                    None => IngredientEvent::Failed {
                        item_id: key.item_id,
                    },
                };
                let _ = event_tx.send(event).await;
            });
        }
        drop(event_tx);

        tokio::spawn(async move {
            // Initial all-pending snapshot so the display has a shape to show.
            if snapshot_tx.send(tracker.snapshot()).await.is_err() {
                return;
            }
            while let Some(event) = event_rx.recv().await {
                tracker.apply(event);
                let snapshot = tracker.snapshot();
                let done = snapshot.complete;
                if snapshot_tx.send(snapshot).await.is_err() || done {
                    return;
                }
            }
        });

        Ok(snapshot_rx)
    }

    /// Drive a plan to completion and return the final snapshot.
    pub async fn plan_to_completion(
        &self,
        recipe: &Recipe,
        criteria: &SearchCriteria,
        sale_price: Option<f64>,
    ) -> Result<RecipeCostSnapshot, PlanError> {
        let mut snapshots = self.plan(recipe, criteria, sale_price)?;
        let mut last = None;
        while let Some(snapshot) = snapshots.recv().await {
            last = Some(snapshot);
        }
        // The reducer always emits the initial snapshot before exiting.
        Ok(last.expect("snapshot channel closed before the initial snapshot"))
    }
}
