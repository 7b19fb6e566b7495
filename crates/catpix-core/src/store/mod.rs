//! Persistence: the store trait, the SQLite implementation, and the
//! call-owned tag vocabulary used during batch saves.

mod sqlite;
mod traits;
mod vocab;

pub use sqlite::SqliteStore;
pub use traits::ImageStore;
pub use vocab::{TagSlot, TagVocabulary};
