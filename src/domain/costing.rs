//! Running per-ingredient costs and the whole-recipe aggregate.
//!
//! Each fetch completion becomes an [`IngredientEvent`] folded into the
//! tracker; every fold produces a fresh immutable [`RecipeCostSnapshot`]
//! rather than mutating a shared one in place.

use super::allocation::AllocationResult;
use super::entities::{ItemId, Recipe, SearchCriteria};

/// Resolution state of one ingredient requirement.
#[derive(Clone, Debug, PartialEq)]
pub enum IngredientStatus {
    /// Fetch not yet completed.
    Pending,
    /// Fetch failed; stays unresolved for this search cycle.
    Failed,
    Resolved(AllocationResult),
}

impl IngredientStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IngredientStatus::Pending)
    }
}

/// One fetch completion, fed into the tracker fold.
#[derive(Clone, Debug, PartialEq)]
pub enum IngredientEvent {
    Resolved {
        item_id: ItemId,
        allocation: AllocationResult,
    },
    Failed {
        item_id: ItemId,
    },
}

/// Per-ingredient cost line inside a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct IngredientCostLine {
    pub item_id: ItemId,
    pub quantity_per_craft: u32,
    /// Scaled requirement for the whole batch.
    pub required: u32,
    pub status: IngredientStatus,
}

impl IngredientCostLine {
    /// Cost to buy enough for the batch; 0 while unresolved.
    pub fn cost_to_buy(&self) -> u64 {
        match &self.status {
            IngredientStatus::Resolved(allocation) => allocation.total_cost,
            _ => 0,
        }
    }

    /// Cheapest observed per-unit price; None while unresolved or empty.
    pub fn cheapest_unit_price(&self) -> Option<f64> {
        match &self.status {
            IngredientStatus::Resolved(allocation) => allocation.cheapest_unit_price(),
            _ => None,
        }
    }
}

/// Derived, recomputed whole-recipe figures. Recreated on every event.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeCostSnapshot {
    pub recipe_id: u32,
    /// Σ cost-to-buy-enough over resolved ingredients. Under-stated while
    /// fetches are outstanding; callers should label it as loading until
    /// `complete`.
    pub total_cost_to_buy: u64,
    /// Σ cheapest-per-unit × quantity-per-craft over resolved ingredients.
    pub cost_per_craft: f64,
    /// Sale price minus cost-per-craft. None when no sale price is known.
    pub profit: Option<f64>,
    pub ingredients: Vec<IngredientCostLine>,
    pub resolved: usize,
    pub failed: usize,
    /// Every ingredient reached a terminal state (resolved or failed).
    pub complete: bool,
}

impl RecipeCostSnapshot {
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Any resolved ingredient whose supply could not cover the requirement.
    pub fn has_shortfall(&self) -> bool {
        self.ingredients.iter().any(|line| match &line.status {
            IngredientStatus::Resolved(allocation) => allocation.shortfall,
            _ => false,
        })
    }
}

/// Tracks the latest allocation per ingredient for one recipe search.
///
/// Resolved ingredients are never un-resolved, so successive snapshots are
/// monotonically refined. `snapshot()` is a pure fold over current state:
/// calling it twice without an intervening event yields identical results.
#[derive(Clone, Debug)]
pub struct IngredientCostTracker {
    recipe_id: u32,
    sale_price: Option<f64>,
    lines: Vec<IngredientCostLine>,
}

impl IngredientCostTracker {
    pub fn new(recipe: &Recipe, criteria: &SearchCriteria, sale_price: Option<f64>) -> Self {
        let lines = recipe
            .ingredients
            .iter()
            .map(|requirement| IngredientCostLine {
                item_id: requirement.item_id,
                quantity_per_craft: requirement.quantity_per_craft,
                required: requirement.scaled(criteria.craft_quantity),
                status: IngredientStatus::Pending,
            })
            .collect();
        Self {
            recipe_id: recipe.id,
            sale_price,
            lines,
        }
    }

    /// Fold one fetch completion into the tracker.
    ///
    /// Only a pending line accepts an event; terminal lines are left alone, so
    /// a duplicate or late completion cannot regress the aggregate.
    pub fn apply(&mut self, event: IngredientEvent) {
        let (item_id, status) = match event {
            IngredientEvent::Resolved {
                item_id,
                allocation,
            } => (item_id, IngredientStatus::Resolved(allocation)),
            IngredientEvent::Failed { item_id } => (item_id, IngredientStatus::Failed),
        };
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.item_id == item_id && !line.status.is_terminal())
        {
            line.status = status;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.lines.iter().all(|line| line.status.is_terminal())
    }

    /// Build a fresh snapshot from current state.
    pub fn snapshot(&self) -> RecipeCostSnapshot {
        let total_cost_to_buy = self.lines.iter().map(IngredientCostLine::cost_to_buy).sum();
        let cost_per_craft = self
            .lines
            .iter()
            .filter_map(|line| {
                line.cheapest_unit_price()
                    .map(|price| price * line.quantity_per_craft as f64)
            })
            .sum();
        let resolved = self
            .lines
            .iter()
            .filter(|line| matches!(line.status, IngredientStatus::Resolved(_)))
            .count();
        let failed = self
            .lines
            .iter()
            .filter(|line| matches!(line.status, IngredientStatus::Failed))
            .count();

        RecipeCostSnapshot {
            recipe_id: self.recipe_id,
            total_cost_to_buy,
            cost_per_craft,
            profit: self.sale_price.map(|price| price - cost_per_craft),
            ingredients: self.lines.clone(),
            resolved,
            failed,
            complete: self.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::allocate;
    use crate::domain::entities::{IngredientRequirement, Listing};

    fn listing(item_id: ItemId, price_per_unit: f64, quantity: u32) -> Listing {
        Listing {
            item_id,
            world_id: 34,
            price_per_unit,
            quantity,
            total_price: (price_per_unit * quantity as f64) as u64,
            hq: false,
            retainer_name: "Tataru".to_string(),
        }
    }

    fn recipe(ingredients: &[(ItemId, u32)]) -> Recipe {
        Recipe {
            id: 900,
            result_item_id: 5594,
            result_item_quantity: 1,
            ingredients: ingredients
                .iter()
                .map(|&(item_id, quantity_per_craft)| IngredientRequirement {
                    item_id,
                    quantity_per_craft,
                })
                .collect(),
        }
    }

    fn criteria(craft_quantity: u32) -> SearchCriteria {
        SearchCriteria {
            location: "Ultros".to_string(),
            craft_quantity,
            hq: false,
        }
    }

    #[test]
    fn per_craft_cost_and_profit_use_cheapest_unit_prices() {
        // 2x item A at 3g each, 1x item B at 10g each, 5 crafts, sells for 50g.
        let r = recipe(&[(1, 2), (2, 1)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(5), Some(50.0));

        tracker.apply(IngredientEvent::Resolved {
            item_id: 1,
            allocation: allocate(&[listing(1, 3.0, 10)], 10),
        });
        tracker.apply(IngredientEvent::Resolved {
            item_id: 2,
            allocation: allocate(&[listing(2, 10.0, 5)], 5),
        });

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.cost_per_craft, 2.0 * 3.0 + 10.0);
        assert_eq!(snapshot.profit, Some(50.0 - 16.0));
        assert!(snapshot.complete);
    }

    #[test]
    fn pending_ingredients_contribute_zero_not_an_error() {
        let r = recipe(&[(1, 1), (2, 1)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(1), Some(100.0));

        tracker.apply(IngredientEvent::Resolved {
            item_id: 1,
            allocation: allocate(&[listing(1, 5.0, 4)], 1),
        });

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_cost_to_buy, 20);
        assert!(!snapshot.complete);
        assert_eq!(snapshot.resolved, 1);
        assert_eq!(snapshot.ingredients[1].status, IngredientStatus::Pending);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let r = recipe(&[(1, 2), (2, 3)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(4), Some(75.5));
        tracker.apply(IngredientEvent::Resolved {
            item_id: 1,
            allocation: allocate(&[listing(1, 2.5, 3), listing(1, 3.5, 8)], 8),
        });
        tracker.apply(IngredientEvent::Failed { item_id: 2 });

        assert_eq!(tracker.snapshot(), tracker.snapshot());
    }

    #[test]
    fn total_cost_only_grows_as_ingredients_resolve() {
        let r = recipe(&[(1, 1), (2, 1), (3, 2)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(2), None);

        let mut last_total = tracker.snapshot().total_cost_to_buy;
        for (item_id, price) in [(3, 7.0), (1, 2.0), (2, 11.0)] {
            tracker.apply(IngredientEvent::Resolved {
                item_id,
                allocation: allocate(&[listing(item_id, price, 20)], 4),
            });
            let total = tracker.snapshot().total_cost_to_buy;
            assert!(total >= last_total);
            last_total = total;
        }
        assert!(tracker.snapshot().complete);
    }

    #[test]
    fn resolved_ingredients_are_never_unresolved() {
        let r = recipe(&[(1, 1)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(1), None);

        tracker.apply(IngredientEvent::Resolved {
            item_id: 1,
            allocation: allocate(&[listing(1, 4.0, 2)], 1),
        });
        let before = tracker.snapshot();

        // Late failure for the same ingredient must not regress it.
        tracker.apply(IngredientEvent::Failed { item_id: 1 });
        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn missing_sale_price_suppresses_profit_only() {
        let r = recipe(&[(1, 1)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(1), None);
        tracker.apply(IngredientEvent::Resolved {
            item_id: 1,
            allocation: allocate(&[listing(1, 4.0, 2)], 1),
        });

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.profit, None);
        assert_eq!(snapshot.cost_per_craft, 4.0);
        assert_eq!(snapshot.total_cost_to_buy, 8);
    }

    #[test]
    fn failed_ingredient_still_lets_search_complete() {
        let r = recipe(&[(1, 1), (2, 1)]);
        let mut tracker = IngredientCostTracker::new(&r, &criteria(1), Some(30.0));
        tracker.apply(IngredientEvent::Failed { item_id: 1 });
        tracker.apply(IngredientEvent::Resolved {
            item_id: 2,
            allocation: allocate(&[listing(2, 6.0, 1)], 1),
        });

        let snapshot = tracker.snapshot();
        assert!(snapshot.complete);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.total_cost_to_buy, 6);
    }
}
