//! Read path: validators, typed cache keys, and the query/cache service.

mod cache_key;
mod images;
pub mod validate;

pub use cache_key::CacheKey;
pub use images::ImageService;
