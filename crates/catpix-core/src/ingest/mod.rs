//! Ingestion: content hashing and the fetch-and-ingest pipeline.

pub mod hashing;
mod pipeline;

pub use hashing::compute_content_hash;
pub use pipeline::IngestPipeline;
