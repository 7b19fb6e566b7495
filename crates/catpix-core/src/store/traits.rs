//! Persistent store trait.

use crate::error::Result;
use crate::models::{ImageCandidate, ImageRecord, Tag};

/// Persistent store for image records and the tag vocabulary.
///
/// All operations are synchronous to match rusqlite's API. The store is
/// append-only: records and tags are only ever created by
/// [`save_images`](ImageStore::save_images), never updated or deleted.
pub trait ImageStore: Send + Sync {
    /// Persist a batch of candidates as one transaction.
    ///
    /// Tags are resolved case-insensitively against the existing
    /// vocabulary; candidates whose content hash already exists (in the
    /// store or earlier in the same batch) are silently skipped. Returns
    /// the number of records actually added. An empty batch is valid and
    /// returns 0 without touching the store.
    fn save_images(&self, candidates: &[ImageCandidate]) -> Result<u64>;

    /// Look up one record with its tags. Absence is `Ok(None)`.
    fn find_by_id(&self, id: i64) -> Result<Option<ImageRecord>>;

    /// One page of records ordered by ascending id, plus the total count.
    fn find_page(&self, offset: u64, limit: u32) -> Result<(Vec<ImageRecord>, u64)>;

    /// Like [`find_page`](ImageStore::find_page), restricted to records
    /// carrying the given tag. The match is case-insensitive, the same
    /// comparison used when tags are written.
    fn find_page_by_tag(&self, offset: u64, limit: u32, tag: &str)
        -> Result<(Vec<ImageRecord>, u64)>;

    /// The whole tag vocabulary, ascending id.
    fn find_tags_all(&self) -> Result<Vec<Tag>>;

    /// Whether a record with this content hash is already persisted.
    fn exists_by_content_hash(&self, hash: &str) -> Result<bool>;
}
