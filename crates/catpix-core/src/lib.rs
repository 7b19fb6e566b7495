//! catpix-core — catalog image ingestion, content dedup, and cached queries.
//!
//! This crate ingests image records from a third-party catalog API,
//! deduplicates them by content hash, merges a case-insensitive tag
//! vocabulary, persists everything in SQLite, and serves paginated,
//! optionally tag-filtered, read-through-cached queries. It can be used
//! programmatically without any HTTP layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use catpix_core::{CatalogClient, ImageService, IngestPipeline, SqliteStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> catpix_core::Result<()> {
//!     let store = Arc::new(SqliteStore::open("catpix.sqlite")?);
//!     let catalog = CatalogClient::new(std::env::var("CATALOG_API_KEY").unwrap())?;
//!
//!     let pipeline = IngestPipeline::new(catalog, store.clone());
//!     let added = pipeline.fetch_and_ingest().await?;
//!     println!("Added {} new records", added);
//!
//!     let service = ImageService::new(store);
//!     let page = service.get_paginated("1", "10")?;
//!     println!("{} pages total", page.total_pages);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use catalog::{CatalogClient, CatalogImage, CatalogSource};
pub use error::{CatpixError, FieldError, Result};
pub use ingest::{compute_content_hash, IngestPipeline};
pub use models::{ImageCandidate, ImageRecord, Page, Tag, TagCandidate};
pub use service::{CacheKey, ImageService};
pub use store::{ImageStore, SqliteStore};
