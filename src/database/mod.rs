/*!
 * Database module for persistent storage of localization records.
 *
 * This module provides SQLite-based persistence for:
 * - Source text extracted from language-pack XML files
 * - Translations written back by the dispatcher or by an operator
 */

pub mod schema;
pub mod connection;
pub mod models;
pub mod store;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{Record, SeedOutcome, StoreStats};
pub use store::{ContentStore, is_valid_content_id};
