//! Procurement costing for crafted items: resolve the cheapest market-board
//! listings for a recipe's ingredients, build a minimum-cost purchase plan and
//! estimate the profit per craft, refining the figures as listing data
//! arrives.

pub mod config;
pub mod domain;
pub mod infra;
pub mod session;

pub use session::{PlanError, SearchSession};
