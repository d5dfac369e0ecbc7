/*!
 * Database entity models.
 *
 * These structures map directly to rows of the `terms` table and to the
 * aggregate views the pipeline reports after each run.
 */

use std::fmt;

/// One localized string tracked by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 37 character alphanumeric content id
    pub id: String,
    /// Original-language text
    pub source_text: String,
    /// Translation, `None` while the record is pending
    pub translated_text: Option<String>,
}

impl Record {
    /// A record is pending until it carries a translation
    pub fn is_pending(&self) -> bool {
        self.translated_text.is_none()
    }
}

/// Result of importing one reference translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The id was unknown and a complete record was created
    Inserted,
    /// A pending record received the reference translation
    Filled,
    /// The record was already complete and was left untouched
    AlreadyComplete,
    /// The id or text failed validation
    Rejected,
}

impl SeedOutcome {
    /// Whether the store changed
    pub fn changed(&self) -> bool {
        matches!(self, SeedOutcome::Inserted | SeedOutcome::Filled)
    }
}

/// Store-wide record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of records
    pub total: usize,
    /// Records without a translation
    pub pending: usize,
    /// Records with a translation
    pub complete: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Records: {}, Complete: {}, Pending: {}",
            self.total, self.complete, self.pending
        )
    }
}
