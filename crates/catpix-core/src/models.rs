//! Domain model: persisted image records, tags, and in-flight candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted image record, including its resolved tags.
///
/// `id` is assigned by the store at first successful persistence and never
/// changes. `content_hash` is globally unique and is the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    /// Store-assigned sequential id.
    pub id: i64,
    /// Id of the same asset in the source catalog. Not unique across fetches.
    pub external_id: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// URL or path of the image. The record stores a reference, not bytes.
    pub image_ref: String,
    /// Lowercase hex SHA-256 of the downloaded bytes.
    pub content_hash: String,
    /// When the record was ingested.
    pub created_at: DateTime<Utc>,
    /// Tags linked to this record, in tag-id order.
    pub tags: Vec<Tag>,
}

/// A normalized temperament token, unique case-insensitively across the
/// whole vocabulary ("Friendly" and "friendly" are the same tag).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    /// Display form: the casing of the first occurrence wins.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A not-yet-persisted record produced by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCandidate {
    pub external_id: String,
    pub width: u32,
    pub height: u32,
    pub image_ref: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    /// Candidate tag names in extraction order. May contain duplicates;
    /// resolution against the vocabulary dedups them.
    pub tag_names: Vec<TagCandidate>,
}

/// A candidate tag name carried alongside an [`ImageCandidate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TagCandidate {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TagCandidate {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }
}

/// One page of a paginated query result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Items on this page, ascending id.
    pub items: Vec<T>,
    /// 1-based page number that was requested.
    pub page: u32,
    /// Total number of pages at the requested page size.
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Build a page from its items and the store's total row count.
    pub fn new(items: Vec<T>, page: u32, total_count: u64, page_size: u32) -> Self {
        let total_pages = total_count.div_ceil(page_size as u64) as u32;
        Self {
            items,
            page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 1, 15, 5);
        assert_eq!(page.total_pages, 3);
        let page: Page<u8> = Page::new(vec![], 1, 16, 5);
        assert_eq!(page.total_pages, 4);
        let page: Page<u8> = Page::new(vec![], 1, 0, 5);
        assert_eq!(page.total_pages, 0);
    }
}
