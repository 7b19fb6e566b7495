//! Read-path service: validated, cached queries over the image store.
//!
//! Every operation follows the same shape: validate, cache lookup, store
//! query on miss, shape the response, populate the cache, return. Reads
//! never mutate the store; concurrent populations of the same key are a
//! benign last-writer-wins race since entries derive from the same store
//! state.

use crate::config::QueryCacheConfig;
use crate::error::Result;
use crate::models::{ImageRecord, Page};
use crate::service::cache_key::CacheKey;
use crate::service::validate::{validate_id, validate_pagination, validate_tag};
use crate::store::ImageStore;
use mini_moka::sync::Cache;
use std::sync::Arc;
use tracing::{debug, info};

/// What one cache slot holds, depending on the operation that filled it.
#[derive(Debug, Clone)]
enum CachedEntry {
    Record(ImageRecord),
    Page(Page<ImageRecord>),
}

/// Query service with a read-through in-memory cache.
///
/// Entries live under both a sliding window (re-armed on access) and an
/// absolute ceiling; whichever fires first evicts. Ingestion does not
/// invalidate the cache, so the absolute ceiling bounds staleness.
pub struct ImageService {
    store: Arc<dyn ImageStore>,
    cache: Cache<CacheKey, CachedEntry>,
}

impl ImageService {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        let cache = Cache::builder()
            .time_to_idle(QueryCacheConfig::SLIDING_TTL)
            .time_to_live(QueryCacheConfig::ABSOLUTE_TTL)
            .max_capacity(QueryCacheConfig::MAX_CAPACITY)
            .build();

        Self { store, cache }
    }

    /// Look up a single record by its id string.
    ///
    /// Absence is `Ok(None)` and is never cached.
    pub fn get_by_id(&self, id: &str) -> Result<Option<ImageRecord>> {
        let parsed = validate_id(id)?;
        let key = CacheKey::by_id(parsed);

        if let Some(CachedEntry::Record(record)) = self.cache.get(&key) {
            debug!("Cache hit for record {}", parsed);
            return Ok(Some(record));
        }

        match self.store.find_by_id(parsed)? {
            Some(record) => {
                info!("Caching record {}", parsed);
                self.cache.insert(key, CachedEntry::Record(record.clone()));
                Ok(Some(record))
            }
            None => {
                debug!("Record {} not found", parsed);
                Ok(None)
            }
        }
    }

    /// One page of all records, ascending id.
    pub fn get_paginated(&self, page: &str, page_size: &str) -> Result<Page<ImageRecord>> {
        let (page, page_size) = validate_pagination(page, page_size)?;
        let key = CacheKey::page(page, page_size);

        if let Some(CachedEntry::Page(cached)) = self.cache.get(&key) {
            debug!("Cache hit for page {} (size {})", page, page_size);
            return Ok(cached);
        }

        let offset = (page as u64 - 1) * page_size as u64;
        let (records, total) = self.store.find_page(offset, page_size)?;
        debug!("Fetched page {} of {} records", page, total);

        let result = Page::new(records, page, total, page_size);
        info!("Caching page {} (size {})", page, page_size);
        self.cache.insert(key, CachedEntry::Page(result.clone()));
        Ok(result)
    }

    /// One page of records carrying the given tag, ascending id.
    ///
    /// The tag match is case-insensitive, mirroring the comparison used
    /// when tags are written.
    pub fn get_paginated_by_tag(
        &self,
        page: &str,
        page_size: &str,
        tag: &str,
    ) -> Result<Page<ImageRecord>> {
        let (page, page_size) = validate_pagination(page, page_size)?;
        validate_tag(tag)?;
        let key = CacheKey::page_by_tag(page, page_size, tag);

        if let Some(CachedEntry::Page(cached)) = self.cache.get(&key) {
            debug!("Cache hit for page {} (size {}) tag '{}'", page, page_size, tag);
            return Ok(cached);
        }

        let offset = (page as u64 - 1) * page_size as u64;
        let (records, total) = self.store.find_page_by_tag(offset, page_size, tag)?;
        debug!("Fetched page {} of {} records for tag '{}'", page, total, tag);

        let result = Page::new(records, page, total, page_size);
        info!("Caching page {} (size {}) tag '{}'", page, page_size, tag);
        self.cache.insert(key, CachedEntry::Page(result.clone()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageCandidate, Tag, TagCandidate};
    use crate::store::SqliteStore;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Store wrapper that counts how often each query path is taken.
    struct CountingStore {
        inner: SqliteStore,
        by_id_calls: AtomicUsize,
        page_calls: AtomicUsize,
        page_by_tag_calls: AtomicUsize,
    }

    impl CountingStore {
        fn new(inner: SqliteStore) -> Self {
            Self {
                inner,
                by_id_calls: AtomicUsize::new(0),
                page_calls: AtomicUsize::new(0),
                page_by_tag_calls: AtomicUsize::new(0),
            }
        }
    }

    impl ImageStore for CountingStore {
        fn save_images(&self, candidates: &[ImageCandidate]) -> Result<u64> {
            self.inner.save_images(candidates)
        }

        fn find_by_id(&self, id: i64) -> Result<Option<ImageRecord>> {
            self.by_id_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id)
        }

        fn find_page(&self, offset: u64, limit: u32) -> Result<(Vec<ImageRecord>, u64)> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_page(offset, limit)
        }

        fn find_page_by_tag(
            &self,
            offset: u64,
            limit: u32,
            tag: &str,
        ) -> Result<(Vec<ImageRecord>, u64)> {
            self.page_by_tag_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_page_by_tag(offset, limit, tag)
        }

        fn find_tags_all(&self) -> Result<Vec<Tag>> {
            self.inner.find_tags_all()
        }

        fn exists_by_content_hash(&self, hash: &str) -> Result<bool> {
            self.inner.exists_by_content_hash(hash)
        }
    }

    /// Store that fails the test if any query reaches it.
    struct UnreachableStore;

    impl ImageStore for UnreachableStore {
        fn save_images(&self, _: &[ImageCandidate]) -> Result<u64> {
            panic!("store must not be reached");
        }
        fn find_by_id(&self, _: i64) -> Result<Option<ImageRecord>> {
            panic!("store must not be reached");
        }
        fn find_page(&self, _: u64, _: u32) -> Result<(Vec<ImageRecord>, u64)> {
            panic!("store must not be reached");
        }
        fn find_page_by_tag(&self, _: u64, _: u32, _: &str) -> Result<(Vec<ImageRecord>, u64)> {
            panic!("store must not be reached");
        }
        fn find_tags_all(&self) -> Result<Vec<Tag>> {
            panic!("store must not be reached");
        }
        fn exists_by_content_hash(&self, _: &str) -> Result<bool> {
            panic!("store must not be reached");
        }
    }

    fn seeded_store(count: usize) -> (TempDir, Arc<CountingStore>) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("test.sqlite")).unwrap();

        let now = Utc::now();
        let batch: Vec<ImageCandidate> = (1..=count)
            .map(|i| ImageCandidate {
                external_id: format!("x{}", i),
                width: 100,
                height: 100,
                image_ref: format!("https://cdn.example.com/x{}.jpg", i),
                content_hash: format!("hash{}", i),
                created_at: now,
                // Odd records are "Friendly", even are "Aloof".
                tag_names: vec![TagCandidate::new(
                    if i % 2 == 1 { "Friendly" } else { "Aloof" },
                    now,
                )],
            })
            .collect();
        store.save_images(&batch).unwrap();

        (dir, Arc::new(CountingStore::new(store)))
    }

    #[test]
    fn test_invalid_ids_never_reach_the_store() {
        let service = ImageService::new(Arc::new(UnreachableStore));
        for bad in ["0", "-1", "abc", ""] {
            let err = service.get_by_id(bad).unwrap_err();
            assert!(err.is_validation(), "{:?} should fail validation", bad);
        }
    }

    #[test]
    fn test_invalid_pagination_never_reaches_the_store() {
        let service = ImageService::new(Arc::new(UnreachableStore));
        assert!(service.get_paginated("0", "10").unwrap_err().is_validation());
        assert!(service.get_paginated("1", "nope").unwrap_err().is_validation());
        assert!(service
            .get_paginated_by_tag("1", "10", "42")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_get_by_id_caches_positive_results() {
        let (_dir, store) = seeded_store(3);
        let service = ImageService::new(store.clone());

        let first = service.get_by_id("2").unwrap().unwrap();
        let second = service.get_by_id("2").unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.by_id_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_by_id_does_not_cache_absence() {
        let (_dir, store) = seeded_store(1);
        let service = ImageService::new(store.clone());

        assert!(service.get_by_id("99").unwrap().is_none());
        assert!(service.get_by_id("99").unwrap().is_none());
        // Both misses went to the store.
        assert_eq!(store.by_id_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pagination_math() {
        let (_dir, store) = seeded_store(15);
        let service = ImageService::new(store);

        let page = service.get_paginated("2", "5").unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, [6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_paginated_result_is_cached() {
        let (_dir, store) = seeded_store(4);
        let service = ImageService::new(store.clone());

        let first = service.get_paginated("1", "10").unwrap();
        let second = service.get_paginated("1", "10").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.page_calls.load(Ordering::SeqCst), 1);

        // A different shape misses.
        service.get_paginated("1", "2").unwrap();
        assert_eq!(store.page_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_plain_and_tagged_pages_use_distinct_cache_entries() {
        let (_dir, store) = seeded_store(6);
        let service = ImageService::new(store.clone());

        service.get_paginated("1", "10").unwrap();
        service.get_paginated_by_tag("1", "10", "friendly").unwrap();

        // Same numbers, different operations: each hit its own query once.
        assert_eq!(store.page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.page_by_tag_calls.load(Ordering::SeqCst), 1);

        // Repeats are served from the cache.
        service.get_paginated("1", "10").unwrap();
        service.get_paginated_by_tag("1", "10", "friendly").unwrap();
        assert_eq!(store.page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.page_by_tag_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tag_filter_matches_write_side_comparison() {
        let (_dir, store) = seeded_store(6);
        let service = ImageService::new(store.clone());

        // Tags were written as "Friendly"; query with different casing.
        let page = service.get_paginated_by_tag("1", "10", "FRIENDLY").unwrap();
        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 3, 5]);

        // Casing variants share one cache entry thanks to key normalization.
        service.get_paginated_by_tag("1", "10", "friendly").unwrap();
        assert_eq!(store.page_by_tag_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_store_yields_empty_page() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("empty.sqlite")).unwrap();
        let service = ImageService::new(Arc::new(store));

        let page = service.get_paginated("1", "10").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
