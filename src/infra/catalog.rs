//! Item and recipe catalog, built from the ffxiv-datamining CSV dumps.

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{IngredientRequirement, Item, ItemId, Recipe};

const ITEM_CSV_URL: &str =
    "https://raw.githubusercontent.com/viion/ffxiv-datamining/master/csv/Item.csv";
const RECIPE_CSV_URL: &str =
    "https://raw.githubusercontent.com/viion/ffxiv-datamining/master/csv/Recipe.csv";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed catalog csv: {0}")]
    Malformed(String),
}

/// The item/recipe catalog the search layer works against.
#[derive(Debug)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub recipes: Vec<Recipe>,
    /// Items that appear as the result of at least one recipe.
    pub craftable_items: Vec<Item>,
}

impl Catalog {
    /// Download and parse the catalog dumps.
    pub async fn fetch(http: &reqwest::Client) -> Result<Self, CatalogError> {
        info!("loading catalog data");
        let item_csv = http.get(ITEM_CSV_URL).send().await?.text().await?;
        let recipe_csv = http.get(RECIPE_CSV_URL).send().await?.text().await?;
        let catalog = Self::from_csv(&item_csv, &recipe_csv)?;
        info!(
            "catalog loaded: {} items, {} recipes, {} craftable",
            catalog.items.len(),
            catalog.recipes.len(),
            catalog.craftable_items.len()
        );
        Ok(catalog)
    }

    /// Parse the two raw CSV dumps. Rows that fail to deserialize are skipped
    /// with a warning, matching how sparse the upstream dumps are.
    pub fn from_csv(item_csv: &str, recipe_csv: &str) -> Result<Self, CatalogError> {
        let item_csv = strip_preamble(item_csv)?;
        let mut items = Vec::new();
        for row in csv::Reader::from_reader(item_csv.as_bytes()).deserialize() {
            match row {
                Ok(row) => {
                    let row: ItemCsvRow = row;
                    items.push(Item::from(row));
                }
                Err(error) => warn!("skipping item row: {error}"),
            }
        }

        let recipe_csv = strip_preamble(recipe_csv)?;
        let mut recipes = Vec::new();
        let mut craftable_items = Vec::new();
        for row in csv::Reader::from_reader(recipe_csv.as_bytes()).deserialize() {
            let row: RecipeCsvRow = match row {
                Ok(row) => row,
                Err(error) => {
                    warn!("skipping recipe row: {error}");
                    continue;
                }
            };
            let recipe = Recipe::from(row);
            if recipe.ingredients.is_empty() {
                continue;
            }
            if let Some(item) = items.iter().find(|i| i.id == recipe.result_item_id) {
                if !craftable_items.iter().any(|c: &Item| c.id == item.id) {
                    craftable_items.push(item.clone());
                }
                recipes.push(recipe);
            }
        }

        Ok(Self {
            items,
            recipes,
            craftable_items,
        })
    }

    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.name.as_str())
    }

    /// Case-insensitive lookup among craftable items.
    pub fn craftable_by_name(&self, name: &str) -> Option<&Item> {
        self.craftable_items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn recipes_for_item(&self, result_item_id: ItemId) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.result_item_id == result_item_id)
            .collect()
    }
}

/// The dumps carry three header lines: column indexes, column names, column
/// types. Keep the names row so the csv reader can map by header, drop the
/// other two.
fn strip_preamble(raw: &str) -> Result<String, CatalogError> {
    let mut lines = raw.lines();
    let _indexes = lines
        .next()
        .ok_or_else(|| CatalogError::Malformed("missing index row".to_string()))?;
    let header = lines
        .next()
        .ok_or_else(|| CatalogError::Malformed("missing header row".to_string()))?;
    let _types = lines
        .next()
        .ok_or_else(|| CatalogError::Malformed("missing type row".to_string()))?;

    let mut out = String::with_capacity(raw.len());
    out.push_str(header);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct ItemCsvRow {
    #[serde(rename = "#")]
    id: ItemId,
    #[serde(rename = "Name")]
    name: String,
}

impl From<ItemCsvRow> for Item {
    fn from(row: ItemCsvRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

// Recipe rows flatten up to eight ingredient slots into numbered columns.
#[derive(Debug, Deserialize)]
struct RecipeCsvRow {
    #[serde(rename = "#")]
    id: i64,
    #[serde(rename = "Item{Result}")]
    result_item_id: i64,
    #[serde(rename = "Amount{Result}")]
    result_item_amount: i64,
    #[serde(rename = "Item{Ingredient}[0]")]
    ingredient_item_0: i64,
    #[serde(rename = "Item{Ingredient}[1]")]
    ingredient_item_1: i64,
    #[serde(rename = "Item{Ingredient}[2]")]
    ingredient_item_2: i64,
    #[serde(rename = "Item{Ingredient}[3]")]
    ingredient_item_3: i64,
    #[serde(rename = "Item{Ingredient}[4]")]
    ingredient_item_4: i64,
    #[serde(rename = "Item{Ingredient}[5]")]
    ingredient_item_5: i64,
    #[serde(rename = "Item{Ingredient}[6]")]
    ingredient_item_6: i64,
    #[serde(rename = "Item{Ingredient}[7]")]
    ingredient_item_7: i64,
    #[serde(rename = "Amount{Ingredient}[0]")]
    ingredient_amount_0: i64,
    #[serde(rename = "Amount{Ingredient}[1]")]
    ingredient_amount_1: i64,
    #[serde(rename = "Amount{Ingredient}[2]")]
    ingredient_amount_2: i64,
    #[serde(rename = "Amount{Ingredient}[3]")]
    ingredient_amount_3: i64,
    #[serde(rename = "Amount{Ingredient}[4]")]
    ingredient_amount_4: i64,
    #[serde(rename = "Amount{Ingredient}[5]")]
    ingredient_amount_5: i64,
    #[serde(rename = "Amount{Ingredient}[6]")]
    ingredient_amount_6: i64,
    #[serde(rename = "Amount{Ingredient}[7]")]
    ingredient_amount_7: i64,
}

impl From<RecipeCsvRow> for Recipe {
    fn from(row: RecipeCsvRow) -> Self {
        let slots = [
            (row.ingredient_item_0, row.ingredient_amount_0),
            (row.ingredient_item_1, row.ingredient_amount_1),
            (row.ingredient_item_2, row.ingredient_amount_2),
            (row.ingredient_item_3, row.ingredient_amount_3),
            (row.ingredient_item_4, row.ingredient_amount_4),
            (row.ingredient_item_5, row.ingredient_amount_5),
            (row.ingredient_item_6, row.ingredient_amount_6),
            (row.ingredient_item_7, row.ingredient_amount_7),
        ];
        let ingredients = slots
            .into_iter()
            .filter(|&(item_id, amount)| item_id > 0 && amount > 0)
            .map(|(item_id, amount)| IngredientRequirement {
                item_id: item_id as ItemId,
                quantity_per_craft: amount as u32,
            })
            .collect();

        Self {
            id: row.id as u32,
            result_item_id: row.result_item_id as ItemId,
            result_item_quantity: row.result_item_amount.max(1) as u32,
            ingredients,
        }
    }
}
