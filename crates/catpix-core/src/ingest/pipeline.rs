//! Ingestion pipeline: fetch a catalog batch, derive tags, hash image
//! content, and hand the candidate batch to the store in one call.

use crate::catalog::{CatalogImage, CatalogSource};
use crate::error::{CatpixError, Result};
use crate::ingest::hashing::compute_content_hash;
use crate::models::{ImageCandidate, TagCandidate};
use crate::store::ImageStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates one synchronous ingestion run.
///
/// Downloads happen one at a time inside the loop; a failed download
/// skips that record only. Nothing is persisted until the whole batch
/// is handed to the store.
pub struct IngestPipeline<C: CatalogSource> {
    catalog: C,
    store: Arc<dyn ImageStore>,
}

impl<C: CatalogSource> IngestPipeline<C> {
    pub fn new(catalog: C, store: Arc<dyn ImageStore>) -> Self {
        Self { catalog, store }
    }

    /// Fetch a batch from the catalog and persist it.
    ///
    /// Returns the number of newly added unique records as reported by
    /// the store. Fails with [`CatpixError::EmptySource`] when the
    /// catalog has nothing to offer; catalog transport errors propagate
    /// unchanged.
    pub async fn fetch_and_ingest(&self) -> Result<u64> {
        info!("Fetching images from the catalog API");
        let batch = self.catalog.fetch_batch().await?;

        if batch.is_empty() {
            warn!("Catalog returned no records");
            return Err(CatpixError::EmptySource);
        }
        info!("Fetched {} records from the catalog", batch.len());

        let mut candidates = Vec::with_capacity(batch.len());
        for image in &batch {
            let bytes = match self.catalog.download_image(&image.url).await? {
                Some(bytes) => bytes,
                None => {
                    warn!("Skipping record {}: image download failed", image.id);
                    continue;
                }
            };

            candidates.push(build_candidate(image, &bytes));
        }

        info!(
            "Mapped {} of {} records into candidates",
            candidates.len(),
            batch.len()
        );

        let added = self.store.save_images(&candidates)?;
        info!("Ingestion run added {} new records", added);
        Ok(added)
    }
}

/// Map one catalog record plus its downloaded bytes into a candidate.
fn build_candidate(image: &CatalogImage, bytes: &[u8]) -> ImageCandidate {
    let now = Utc::now();
    let tag_names = extract_tag_names(image)
        .into_iter()
        .map(|name| TagCandidate::new(name, now))
        .collect();

    ImageCandidate {
        external_id: image.id.clone(),
        width: image.width,
        height: image.height,
        image_ref: image.url.clone(),
        content_hash: compute_content_hash(bytes),
        created_at: now,
        tag_names,
    }
}

/// Extract candidate tag names from a record's breed temperaments.
///
/// Splits each temperament string on commas, trims whitespace, and drops
/// empty tokens. Duplicates are preserved; vocabulary resolution in the
/// store dedups them.
fn extract_tag_names(image: &CatalogImage) -> Vec<String> {
    let mut names = Vec::new();
    for breed in &image.breeds {
        if let Some(temperament) = breed.temperament.as_deref() {
            names.extend(
                temperament
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
    }
    names
}
