//! Adapters for the external services the core depends on.

pub mod cache;
pub mod catalog;
pub mod locations;
pub mod universalis;

pub use cache::ListingCache;
pub use catalog::{Catalog, CatalogError};
pub use locations::Locations;
pub use universalis::UniversalisClient;
