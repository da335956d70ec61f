use std::sync::Arc;

use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use log::{info, warn};

use craft_profit_scanner::config::Config;
use craft_profit_scanner::domain::{
    IngredientStatus, LocationScope, MarketProvider, RecipeCostSnapshot, SearchCriteria,
};
use craft_profit_scanner::infra::{Catalog, Locations, UniversalisClient};
use craft_profit_scanner::SearchSession;

#[derive(Parser)]
#[command(
    name = "craft-profit-scanner",
    about = "Price a recipe's ingredients off the market board and estimate craft profit."
)]
struct Args {
    /// Name of the item to craft.
    item: String,
    /// Home world.
    #[arg(long, default_value = "Ultros")]
    world: String,
    /// How wide to search for ingredients.
    #[arg(long, value_enum, default_value = "world")]
    scope: Scope,
    /// Number of crafts.
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    /// Prefer HQ crafting materials.
    #[arg(long)]
    hq: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scope {
    /// My world only.
    World,
    /// Within my datacenter.
    Dc,
    /// Within my region.
    Region,
}

impl From<Scope> for LocationScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::World => LocationScope::World,
            Scope::Dc => LocationScope::DataCenter,
            Scope::Region => LocationScope::Region,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();
    let config = Config::from_env();

    let client = match &config.universalis_base_url {
        Some(base) => UniversalisClient::with_base_url(base)?,
        None => UniversalisClient::new()?,
    };
    let catalog = Catalog::fetch(&reqwest::Client::new()).await?;
    let locations = Locations::fetch(&client).await?;

    let item = catalog
        .craftable_by_name(&args.item)
        .ok_or_else(|| format!("no craftable item named {:?}", args.item))?
        .clone();
    let home_world = locations
        .resolve(LocationScope::World, &args.world)
        .ok_or_else(|| format!("unknown world {:?}", args.world))?;
    let location = locations
        .resolve(args.scope.into(), &args.world)
        .ok_or_else(|| format!("no datacenter known for world {:?}", args.world))?;

    let sale_price = match client.current_sale_price(item.id, &home_world).await {
        Ok(price) => price,
        Err(error) => {
            warn!("could not fetch sale price for {}: {error}", item.name);
            None
        }
    };
    match sale_price {
        Some(price) => println!(
            "{} x{}: currently selling for {price}g each on {home_world}",
            item.name, args.quantity
        ),
        None => println!(
            "{} x{}: no marketboard listings on {home_world}",
            item.name, args.quantity
        ),
    }

    let criteria = SearchCriteria {
        location,
        craft_quantity: args.quantity,
        hq: args.hq,
    };

    // One session per search: every recipe of this item shares the cache.
    let session = SearchSession::new(Arc::new(client));
    for recipe in catalog.recipes_for_item(item.id) {
        let mut snapshots = session.plan(recipe, &criteria, sale_price)?;
        let mut last = None;
        while let Some(snapshot) = snapshots.recv().await {
            info!(
                "recipe {}: {}/{} ingredients resolved",
                recipe.id,
                snapshot.resolved + snapshot.failed,
                snapshot.ingredient_count()
            );
            last = Some(snapshot);
        }
        if let Some(snapshot) = last {
            print_report(&snapshot, &catalog, &locations);
        }
    }

    Ok(())
}

fn print_report(snapshot: &RecipeCostSnapshot, catalog: &Catalog, locations: &Locations) {
    println!();
    println!("Recipe #{}", snapshot.recipe_id);
    println!("Cost of ingredients to craft 1: {}g", snapshot.cost_per_craft);
    match snapshot.profit {
        Some(profit) => println!("Profit per craft: {profit}g"),
        None => println!("Profit per craft: unknown (no market data for the result)"),
    }
    println!(
        "Cost to buy everything: {}g (may leave you with leftover materials)",
        snapshot.total_cost_to_buy
    );
    println!("Ingredients and where to buy them:");
    for line in &snapshot.ingredients {
        let name = catalog
            .item_name(line.item_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("item #{}", line.item_id));
        println!(
            "  {name} x{} ({} total)",
            line.quantity_per_craft, line.required
        );
        match &line.status {
            IngredientStatus::Resolved(allocation) => {
                for listing in &allocation.listings {
                    let world = locations
                        .world_name(listing.world_id)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("world #{}", listing.world_id));
                    println!(
                        "    Buy {} from {} on {world} for {}g {} [{}g each]",
                        listing.quantity,
                        listing.retainer_name,
                        listing.total_price,
                        if listing.hq { "HQ" } else { "NQ" },
                        listing.price_per_unit
                    );
                }
                if allocation.shortfall {
                    println!(
                        "    Not enough marketboard listings found to buy {} (got {})",
                        allocation.required, allocation.quantity
                    );
                }
            }
            IngredientStatus::Failed => {
                println!("    No listing data (fetch failed)");
            }
            IngredientStatus::Pending => {
                println!("    Loading...");
            }
        }
    }
}
