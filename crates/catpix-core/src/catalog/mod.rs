//! Source catalog integration: wire types and the HTTP client.

mod client;
mod types;

pub use client::{CatalogClient, CatalogSource};
pub use types::{CatalogBreed, CatalogImage};
