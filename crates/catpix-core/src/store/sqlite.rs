//! SQLite-backed image store.
//!
//! Owns the schema and the batch save algorithm: tag resolution against a
//! call-owned vocabulary, content-hash dedup (within the batch and against
//! the store), and a single transaction per batch. Uniqueness that matters
//! for correctness is enforced at the schema level — `content_hash` and the
//! normalized tag name both carry UNIQUE constraints — so concurrent
//! writers degrade to "already exists, re-resolve" instead of duplicates.

use crate::error::{CatpixError, Result};
use crate::models::{ImageCandidate, ImageRecord, Tag};
use crate::store::traits::ImageStore;
use crate::store::vocab::{TagSlot, TagVocabulary};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// SQLite store for image records, tags, and their links.
pub struct SqliteStore {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CatpixError::Io {
                message: format!("Failed to create store directory: {}", e),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| CatpixError::Database {
            message: format!("Failed to open store database: {}", e),
            source: Some(e),
        })?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                image_ref TEXT NOT NULL,
                content_hash TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Tag names are unique case-insensitively; the normalized
            -- form carries the constraint, the display form keeps the
            -- casing of the first occurrence.
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_norm TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS image_tags (
                image_id INTEGER NOT NULL REFERENCES images(id),
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                PRIMARY KEY (image_id, tag_id)
            );

            CREATE INDEX IF NOT EXISTS idx_image_tags_tag
                ON image_tags(tag_id);
            "#,
        )
        .map_err(|e| CatpixError::Database {
            message: format!("Failed to initialize schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CatpixError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })
    }

    /// Load the tags linked to one image, ascending tag id.
    fn load_tags(conn: &Connection, image_id: i64) -> Result<Vec<Tag>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM tags t
            JOIN image_tags it ON it.tag_id = t.id
            WHERE it.image_id = ?1
            ORDER BY t.id
            "#,
        )?;

        let tags = stmt
            .query_map(params![image_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
        Ok(ImageRecord {
            id: row.get(0)?,
            external_id: row.get(1)?,
            width: row.get(2)?,
            height: row.get(3)?,
            image_ref: row.get(4)?,
            content_hash: row.get(5)?,
            created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
            tags: Vec::new(),
        })
    }

    /// Run a paged record query plus its count query, attaching tags.
    fn page_query(
        conn: &Connection,
        select_sql: &str,
        select_params: &[&dyn rusqlite::ToSql],
        count_sql: &str,
        count_params: &[&dyn rusqlite::ToSql],
    ) -> Result<(Vec<ImageRecord>, u64)> {
        let total: i64 = conn.query_row(count_sql, count_params, |row| row.get(0))?;

        let mut stmt = conn.prepare(select_sql)?;
        let mut records = stmt
            .query_map(select_params, Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        for record in &mut records {
            record.tags = Self::load_tags(conn, record.id)?;
        }

        Ok((records, total as u64))
    }
}

impl ImageStore for SqliteStore {
    fn save_images(&self, candidates: &[ImageCandidate]) -> Result<u64> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Load the whole vocabulary once; resolution is then in-memory.
        let mut vocab = TagVocabulary::new();
        let mut existing_count = 0usize;
        {
            let mut stmt = tx.prepare("SELECT id, name FROM tags")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (id, name) = row?;
                vocab.insert_existing(id, &name);
                existing_count += 1;
            }
        }
        info!("Loaded {} existing tags from the store", existing_count);

        // Stage candidates: resolve tags, skip duplicate hashes. A hash
        // seen earlier in this same batch counts as a duplicate too.
        let mut seen_hashes: HashSet<&str> = HashSet::new();
        let mut skipped: u64 = 0;
        let mut staged: Vec<(&ImageCandidate, Vec<TagSlot>)> = Vec::new();

        for candidate in candidates {
            // Resolve tags before the duplicate checks: a skipped record
            // still contributes its novel tag names to the vocabulary,
            // only the record and its links are dropped.
            let mut slots = Vec::new();
            for tag in &candidate.tag_names {
                let slot = vocab.resolve(tag);
                // One link per (image, tag) pair.
                if !slots.contains(&slot) {
                    slots.push(slot);
                }
            }

            if !seen_hashes.insert(&candidate.content_hash) {
                info!(
                    "Skipped duplicate image within batch for external id {}, hash {}",
                    candidate.external_id, candidate.content_hash
                );
                skipped += 1;
                continue;
            }

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM images WHERE content_hash = ?1)",
                params![candidate.content_hash],
                |row| row.get(0),
            )?;
            if exists {
                info!(
                    "Skipped duplicate image for external id {}, hash {}",
                    candidate.external_id, candidate.content_hash
                );
                skipped += 1;
                continue;
            }

            staged.push((candidate, slots));
        }

        // Insert pending tags. ON CONFLICT covers the race where another
        // writer created the same normalized name first: the follow-up
        // select re-resolves to whichever row won.
        let mut pending_ids = Vec::with_capacity(vocab.pending().len());
        for tag in vocab.pending() {
            let norm = TagVocabulary::normalize(&tag.name);
            tx.execute(
                "INSERT INTO tags (name, name_norm, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name_norm) DO NOTHING",
                params![tag.name, norm, tag.created_at.to_rfc3339()],
            )?;
            let id: i64 = tx.query_row(
                "SELECT id FROM tags WHERE name_norm = ?1",
                params![norm],
                |row| row.get(0),
            )?;
            debug!("Added tag '{}' with id {}", tag.name, id);
            pending_ids.push(id);
        }

        // Insert staged records and their links.
        for (candidate, slots) in &staged {
            tx.execute(
                r#"
                INSERT INTO images (external_id, width, height, image_ref, content_hash, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    candidate.external_id,
                    candidate.width,
                    candidate.height,
                    candidate.image_ref,
                    candidate.content_hash,
                    candidate.created_at.to_rfc3339(),
                ],
            )?;
            let image_id = tx.last_insert_rowid();

            for slot in slots {
                let tag_id = match slot {
                    TagSlot::Existing(id) => *id,
                    TagSlot::Pending(index) => pending_ids[*index],
                };
                tx.execute(
                    "INSERT OR IGNORE INTO image_tags (image_id, tag_id) VALUES (?1, ?2)",
                    params![image_id, tag_id],
                )?;
            }
        }

        tx.commit()?;

        let added = candidates.len() as u64 - skipped;
        info!("Saved {} new records, skipped {} duplicates", added, skipped);
        Ok(added)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ImageRecord>> {
        let conn = self.lock()?;

        let record = conn
            .query_row(
                r#"
                SELECT id, external_id, width, height, image_ref, content_hash, created_at
                FROM images WHERE id = ?1
                "#,
                params![id],
                Self::row_to_record,
            )
            .optional()?;

        match record {
            Some(mut record) => {
                record.tags = Self::load_tags(&conn, record.id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn find_page(&self, offset: u64, limit: u32) -> Result<(Vec<ImageRecord>, u64)> {
        let conn = self.lock()?;
        Self::page_query(
            &conn,
            r#"
            SELECT id, external_id, width, height, image_ref, content_hash, created_at
            FROM images
            ORDER BY id ASC
            LIMIT ?1 OFFSET ?2
            "#,
            params![limit as i64, offset as i64],
            "SELECT COUNT(*) FROM images",
            &[],
        )
    }

    fn find_page_by_tag(
        &self,
        offset: u64,
        limit: u32,
        tag: &str,
    ) -> Result<(Vec<ImageRecord>, u64)> {
        let conn = self.lock()?;
        let norm = TagVocabulary::normalize(tag);
        Self::page_query(
            &conn,
            r#"
            SELECT i.id, i.external_id, i.width, i.height, i.image_ref, i.content_hash, i.created_at
            FROM images i
            JOIN image_tags it ON it.image_id = i.id
            JOIN tags t ON t.id = it.tag_id
            WHERE t.name_norm = ?1
            ORDER BY i.id ASC
            LIMIT ?2 OFFSET ?3
            "#,
            params![norm, limit as i64, offset as i64],
            r#"
            SELECT COUNT(*)
            FROM images i
            JOIN image_tags it ON it.image_id = i.id
            JOIN tags t ON t.id = it.tag_id
            WHERE t.name_norm = ?1
            "#,
            params![norm],
        )
    }

    fn find_tags_all(&self) -> Result<Vec<Tag>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn exists_by_content_hash(&self, hash: &str) -> Result<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM images WHERE content_hash = ?1)",
            params![hash],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

/// Parse a store-owned rfc3339 timestamp column.
///
/// The store writes every timestamp itself, so a row that fails to parse
/// is corrupt and surfaces as a database error rather than being papered
/// over with a fresh time.
fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
