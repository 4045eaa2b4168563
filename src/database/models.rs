/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::{Question, VocabularyItem};

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Unique book identifier (UUID)
    pub id: String,
    pub title: String,
    /// Language of the source text
    pub original_language: String,
    /// Language of the translations
    pub target_language: String,
    /// SHA256 of the source text for re-ingestion detection
    pub source_hash: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl BookRecord {
    /// Create a new book record with a fresh identifier
    pub fn new(
        title: impl Into<String>,
        original_language: impl Into<String>,
        target_language: impl Into<String>,
        source_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            original_language: original_language.into(),
            target_language: target_language.into(),
            source_hash: source_hash.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Book listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub book: BookRecord,
    pub scene_count: i64,
}

/// Sentence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Position within the scene, 1-based
    pub sentence_index: i64,
    pub original_text: String,
    pub translated_text: String,
}

/// A scene loaded back from storage with all of its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredScene {
    pub id: i64,
    /// Position within the book, 1-based
    pub scene_index: i64,
    pub title: String,
    pub summary: Option<String>,
    pub original_text: String,
    pub sentence_start: i64,
    pub sentence_end: i64,
    pub sentences: Vec<SentenceRecord>,
    pub vocabulary: Vec<VocabularyItem>,
    pub questions: Vec<Question>,
}
