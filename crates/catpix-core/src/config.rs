//! Centralized configuration constants for catpix.

use std::time::Duration;

/// Catalog API configuration.
pub struct CatalogConfig;

impl CatalogConfig {
    /// Default base URL for the source catalog API.
    pub const API_BASE: &'static str = "https://api.thecatapi.com/v1";
    /// Number of records requested per fetch.
    pub const BATCH_SIZE: u32 = 25;
    /// Timeout for the catalog search request.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    /// Timeout for a single image download.
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
    /// User agent sent with every request.
    pub const USER_AGENT: &'static str = "catpix/0.3";
}

/// Read-path cache configuration.
pub struct QueryCacheConfig;

impl QueryCacheConfig {
    /// Sliding window: an entry untouched for this long is evicted.
    pub const SLIDING_TTL: Duration = Duration::from_secs(5 * 60);
    /// Absolute ceiling: an entry older than this is evicted even if hot.
    pub const ABSOLUTE_TTL: Duration = Duration::from_secs(60 * 60);
    /// Upper bound on cached entries.
    pub const MAX_CAPACITY: u64 = 1_000;
}
