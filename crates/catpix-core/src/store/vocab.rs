//! Case-insensitive tag vocabulary for one save call.
//!
//! The vocabulary is owned by the call that builds it, not shared process
//! state: each save loads the existing tags once, resolves every candidate
//! name against it in memory, and registers new names so later candidates
//! in the same batch reuse them instead of creating case-variant twins.

use crate::models::TagCandidate;
use std::collections::HashMap;

/// Where a resolved tag lives: already in the store, or queued for
/// insertion by this save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSlot {
    /// Tag row already persisted, with its id.
    Existing(i64),
    /// New tag pending insertion; index into [`TagVocabulary::pending`].
    Pending(usize),
}

/// In-memory name→tag lookup keyed on the trimmed, lowercased name.
#[derive(Debug, Default)]
pub struct TagVocabulary {
    by_key: HashMap<String, TagSlot>,
    pending: Vec<TagCandidate>,
}

impl TagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalization used for vocabulary keys and the store's uniqueness
    /// constraint.
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Seed the lookup with a tag that already exists in the store.
    pub fn insert_existing(&mut self, id: i64, name: &str) {
        self.by_key.insert(Self::normalize(name), TagSlot::Existing(id));
    }

    /// Resolve a candidate name, registering it as pending when unseen.
    ///
    /// The display form of a pending tag is the trimmed casing of its
    /// first occurrence.
    pub fn resolve(&mut self, candidate: &TagCandidate) -> TagSlot {
        let key = Self::normalize(&candidate.name);
        if let Some(&slot) = self.by_key.get(&key) {
            return slot;
        }

        let slot = TagSlot::Pending(self.pending.len());
        self.pending.push(TagCandidate::new(
            candidate.name.trim(),
            candidate.created_at,
        ));
        self.by_key.insert(key, slot);
        slot
    }

    /// Tags this call needs to insert, in first-seen order.
    pub fn pending(&self) -> &[TagCandidate] {
        &self.pending
    }
}
