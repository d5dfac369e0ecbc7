/*!
 * Content store for localization records.
 *
 * The store is the single dedup gate of the pipeline: every extracted
 * string passes through `insert_if_new`, every translation lands through
 * `set_translation`. Each operation is one statement executed under the
 * connection lock, so each record's pending → complete transition is atomic
 * on its own and concurrent dispatcher workers never interleave writes.
 */

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{Record, SeedOutcome, StoreStats};
use crate::errors::StoreError;

// @const: Content id format used by the game's language packs
static CONTENT_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]{37}$").expect("content id pattern is valid")
});

/// Check whether `id` is a 37 character alphanumeric content id
pub fn is_valid_content_id(id: &str) -> bool {
    CONTENT_ID_REGEX.is_match(id)
}

/// Process-scoped handle to the `terms` table
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct ContentStore {
    /// Database connection
    db: DatabaseConnection,
}

impl ContentStore {
    /// Create a store over an existing connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (or create) the store file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a store with an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Check whether a record exists for `id`
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let id = id.to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM terms WHERE contentuid = ?1",
                    [&id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
    }

    /// Fetch a single record
    pub async fn get(&self, id: &str) -> Result<Option<Record>> {
        let id = id.to_string();

        self.db
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        "SELECT contentuid, content, translated_content FROM terms WHERE contentuid = ?1",
                        [&id],
                        |row| {
                            Ok(Record {
                                id: row.get(0)?,
                                source_text: row.get(1)?,
                                translated_text: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    /// Insert a new pending record
    ///
    /// Returns `false` without touching the store when the id is malformed,
    /// the text is blank, or the id is already known. Only storage failures
    /// are returned as errors.
    pub async fn insert_if_new(&self, id: &str, source_text: &str) -> Result<bool> {
        if let Err(e) = validate(id, source_text) {
            warn!("Skipping record: {}", e);
            return Ok(false);
        }

        let owned_id = id.to_string();
        let text = source_text.to_string();

        let inserted = self
            .db
            .execute_async(move |conn| {
                let rows = conn.execute(
                    "INSERT OR IGNORE INTO terms (contentuid, content) VALUES (?1, ?2)",
                    params![owned_id, text],
                )?;
                Ok(rows > 0)
            })
            .await?;

        if inserted {
            debug!("Inserted content id {}", id);
        } else {
            debug!("Skipping content id {}: already stored", id);
        }

        Ok(inserted)
    }

    /// Snapshot of all records without a translation, in no particular order
    pub async fn list_pending(&self) -> Result<Vec<(String, String)>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT contentuid, content FROM terms WHERE translated_content IS NULL",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Snapshot of all translated records, in no particular order
    pub async fn list_complete(&self) -> Result<Vec<(String, String)>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT contentuid, translated_content FROM terms WHERE translated_content IS NOT NULL",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Store the translation for an existing record
    pub async fn set_translation(&self, id: &str, translated_text: &str) -> Result<()> {
        let owned_id = id.to_string();
        let text = translated_text.to_string();

        let rows = self
            .db
            .execute_async(move |conn| {
                Ok(conn.execute(
                    "UPDATE terms SET translated_content = ?2 WHERE contentuid = ?1",
                    params![owned_id, text],
                )?)
            })
            .await?;

        if rows == 0 {
            return Err(StoreError::NotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Return a complete record to pending so the next pass translates it again
    ///
    /// Returns whether a translation was cleared. This is the only operation
    /// that removes a translation and is never called by the pipeline itself.
    pub async fn reset_translation(&self, id: &str) -> Result<bool> {
        let owned_id = id.to_string();

        let rows = self
            .db
            .execute_async(move |conn| {
                Ok(conn.execute(
                    "UPDATE terms SET translated_content = NULL
                     WHERE contentuid = ?1 AND translated_content IS NOT NULL",
                    [&owned_id],
                )?)
            })
            .await?;

        if rows == 0 {
            warn!("Nothing to reset for content id {}", id);
        }

        Ok(rows > 0)
    }

    /// Import an existing translation from a reference language pack
    ///
    /// Unknown ids become complete records whose source is the reference
    /// text itself. Pending records get the translation. Complete records
    /// are left alone so operator corrections survive.
    pub async fn seed_translation(&self, id: &str, text: &str) -> Result<SeedOutcome> {
        if let Err(e) = validate(id, text) {
            warn!("Skipping reference record: {}", e);
            return Ok(SeedOutcome::Rejected);
        }

        let owned_id = id.to_string();
        let text = text.to_string();

        self.db
            .execute_async(move |conn| {
                let current: Option<Option<String>> = conn
                    .query_row(
                        "SELECT translated_content FROM terms WHERE contentuid = ?1",
                        [&owned_id],
                        |row| row.get(0),
                    )
                    .optional()?;

                let outcome = match current {
                    None => {
                        conn.execute(
                            "INSERT INTO terms (contentuid, content, translated_content) VALUES (?1, ?2, ?2)",
                            params![owned_id, text],
                        )?;
                        SeedOutcome::Inserted
                    }
                    Some(None) => {
                        conn.execute(
                            "UPDATE terms SET translated_content = ?2 WHERE contentuid = ?1",
                            params![owned_id, text],
                        )?;
                        SeedOutcome::Filled
                    }
                    Some(Some(_)) => SeedOutcome::AlreadyComplete,
                };

                Ok(outcome)
            })
            .await
    }

    /// Count total, pending and complete records
    pub async fn stats(&self) -> Result<StoreStats> {
        self.db
            .execute_async(|conn| {
                let (total, complete): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COUNT(translated_content) FROM terms",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                Ok(StoreStats {
                    total: total as usize,
                    pending: (total - complete) as usize,
                    complete: complete as usize,
                })
            })
            .await
    }
}

/// Validate an id/text pair before it reaches SQL
fn validate(id: &str, text: &str) -> std::result::Result<(), StoreError> {
    if !is_valid_content_id(id) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    if text.trim().is_empty() {
        return Err(StoreError::EmptyText(id.to_string()));
    }
    Ok(())
}
