use serde::{Deserialize, Serialize};

/// Identifier for items in the game catalog.
pub type ItemId = u32;

/// Identifier for worlds (servers).
pub type WorldId = u32;

/// A catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

/// A crafting recipe: one result item plus the ingredients needed per craft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u32,
    pub result_item_id: ItemId,
    pub result_item_quantity: u32,
    pub ingredients: Vec<IngredientRequirement>,
}

/// One line of a recipe: which item, and how many per single craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub item_id: ItemId,
    pub quantity_per_craft: u32,
}

impl IngredientRequirement {
    /// Requirement for a whole batch of `craft_quantity` crafts.
    pub fn scaled(&self, craft_quantity: u32) -> u32 {
        self.quantity_per_craft * craft_quantity
    }
}

/// A sell offer for an item at one world, as reported by the market board.
///
/// Immutable once fetched. The provider does not guarantee any ordering of
/// price/quantity pairs, so consumers must sort before allocating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub item_id: ItemId,
    pub world_id: WorldId,
    pub price_per_unit: f64,
    pub quantity: u32,
    pub total_price: u64,
    pub hq: bool,
    /// Retainer (or NPC vendor) holding the listing.
    pub retainer_name: String,
}

/// How wide a market search reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocationScope {
    #[default]
    World,
    DataCenter,
    Region,
}

/// A world (server) players live on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct World {
    pub id: WorldId,
    pub name: String,
}

/// A datacenter grouping several worlds, itself belonging to a region.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataCenter {
    pub name: String,
    pub region: String,
    pub worlds: Vec<WorldId>,
}

/// Cache key for one cheapest-listings query.
///
/// The key is the 4-tuple exactly as requested: distinct `amount` values for
/// the same item are distinct keys, matching the provider's amount-bounded
/// query semantics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub item_id: ItemId,
    /// Opaque location token produced by the location resolver.
    pub location: String,
    pub amount: u32,
    pub hq: bool,
}

impl std::fmt::Display for ListingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cheapest-{}-{}-{}-{}",
            self.location, self.item_id, self.amount, self.hq
        )
    }
}

/// What the user asked for: where to buy, how many crafts, HQ preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Opaque location token (world, datacenter or region name).
    pub location: String,
    pub craft_quantity: u32,
    pub hq: bool,
}
