//! Typed cache keys for the read path.
//!
//! One variant per operation shape, so differently-parameterized
//! operations can never collide the way interpolated key strings can.

/// Cache address of one read operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Single-record lookup.
    ById(i64),
    /// Unfiltered pagination.
    Page { page: u32, page_size: u32 },
    /// Tag-filtered pagination. The tag is stored normalized so requests
    /// differing only in casing share an entry, matching the store's
    /// comparison.
    PageByTag {
        page: u32,
        page_size: u32,
        tag: String,
    },
}

impl CacheKey {
    pub fn by_id(id: i64) -> Self {
        CacheKey::ById(id)
    }

    pub fn page(page: u32, page_size: u32) -> Self {
        CacheKey::Page { page, page_size }
    }

    pub fn page_by_tag(page: u32, page_size: u32, tag: &str) -> Self {
        CacheKey::PageByTag {
            page,
            page_size,
            tag: tag.trim().to_lowercase(),
        }
    }
}
