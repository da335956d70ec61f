//! Domain logic for procurement costing lives here.

pub mod allocation;
pub mod costing;
pub mod entities;
pub mod providers;

pub use allocation::{allocate, AllocationResult};
pub use costing::{
    IngredientCostLine, IngredientCostTracker, IngredientEvent, IngredientStatus,
    RecipeCostSnapshot,
};
pub use entities::{
    DataCenter, IngredientRequirement, Item, ItemId, Listing, ListingKey, LocationScope, Recipe,
    SearchCriteria, World, WorldId,
};
pub use providers::{MarketError, MarketProvider};
