/*!
 * Database module for persistent storage of ingested books.
 *
 * This module provides SQLite-based persistence for:
 * - Books, keyed by the hash of their source text
 * - Scenes with their sentences and translations
 * - Vocabulary and multiple-choice questions per scene
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{BookRecord, BookSummary, SentenceRecord, StoredScene};
pub use repository::Repository;
