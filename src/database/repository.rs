/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for storing ingested books and
 * reading them back, abstracting away the SQL details.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::connection::DatabaseConnection;
use super::models::{BookRecord, BookSummary, SentenceRecord, StoredScene};
use crate::pipeline::{Question, QuestionOption, ScenePackage, VocabularyItem};

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

fn parse_book_row(row: &Row) -> rusqlite::Result<BookRecord> {
    Ok(BookRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        original_language: row.get(2)?,
        target_language: row.get(3)?,
        source_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const BOOK_COLUMNS: &str = "id, title, original_language, target_language, source_hash, created_at";

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// The underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Book Operations
    // =========================================================================

    /// Store a book with all of its scenes in one transaction
    ///
    /// Either the whole book is written or nothing is.
    pub async fn save_book(&self, book: &BookRecord, scenes: &[ScenePackage]) -> Result<()> {
        let book = book.clone();
        let scenes = scenes.to_vec();

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    &format!("INSERT INTO books ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", BOOK_COLUMNS),
                    params![
                        book.id,
                        book.title,
                        book.original_language,
                        book.target_language,
                        book.source_hash,
                        book.created_at,
                    ],
                )?;

                for package in &scenes {
                    Self::insert_scene(tx, &book.id, package)?;
                }

                debug!("Stored book {} with {} scenes", book.id, scenes.len());
                Ok(())
            })
            .await
    }

    fn insert_scene(tx: &Transaction, book_id: &str, package: &ScenePackage) -> Result<()> {
        let scene = &package.scene;
        tx.execute(
            r#"
            INSERT INTO scenes (book_id, scene_index, title, summary, original_text, sentence_start, sentence_end)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                book_id,
                scene.index as i64,
                scene.title,
                scene.summary,
                scene.content,
                scene.sentence_start as i64,
                scene.sentence_end as i64,
            ],
        )?;
        let scene_id = tx.last_insert_rowid();

        for sentence in &scene.sentences {
            tx.execute(
                "INSERT INTO sentences (scene_id, sentence_index, original_text, translated_text) VALUES (?1, ?2, ?3, ?4)",
                params![scene_id, sentence.index as i64, sentence.original_text, sentence.translated_text],
            )?;
        }

        for item in &package.vocabulary {
            tx.execute(
                r#"
                INSERT INTO vocabulary (scene_id, term, part_of_speech, definition, example_sentence)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![scene_id, item.term, item.part_of_speech, item.definition, item.example_sentence],
            )?;
        }

        for question in &package.questions {
            tx.execute(
                "INSERT INTO questions (scene_id, prompt) VALUES (?1, ?2)",
                params![scene_id, question.prompt],
            )?;
            let question_id = tx.last_insert_rowid();
            for (position, option) in question.options.iter().enumerate() {
                tx.execute(
                    "INSERT INTO question_options (question_id, option_index, text, is_correct) VALUES (?1, ?2, ?3, ?4)",
                    params![question_id, position as i64, option.text, option.is_correct],
                )?;
            }
        }

        Ok(())
    }

    /// Get a book by ID
    pub async fn get_book(&self, book_id: &str) -> Result<Option<BookRecord>> {
        let book_id = book_id.to_string();

        self.db
            .execute_async(move |conn| {
                let book = conn
                    .query_row(
                        &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
                        [&book_id],
                        parse_book_row,
                    )
                    .optional()?;
                Ok(book)
            })
            .await
    }

    /// Find the most recent book ingested from a source with this hash
    pub async fn find_book_by_hash(&self, source_hash: &str) -> Result<Option<BookRecord>> {
        let source_hash = source_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let book = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM books WHERE source_hash = ?1 ORDER BY created_at DESC LIMIT 1",
                            BOOK_COLUMNS
                        ),
                        [&source_hash],
                        parse_book_row,
                    )
                    .optional()?;
                Ok(book)
            })
            .await
    }

    /// List all books with their scene counts, newest first
    pub async fn list_books(&self) -> Result<Vec<BookSummary>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT b.id, b.title, b.original_language, b.target_language, b.source_hash, b.created_at,
                           (SELECT COUNT(*) FROM scenes s WHERE s.book_id = b.id)
                    FROM books b
                    ORDER BY b.created_at DESC
                    "#,
                )?;
                let books = stmt
                    .query_map([], |row| {
                        Ok(BookSummary {
                            book: parse_book_row(row)?,
                            scene_count: row.get(6)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(books)
            })
            .await
    }

    /// Load a book's scenes in order, with sentences, vocabulary and questions
    pub async fn load_scenes(&self, book_id: &str) -> Result<Vec<StoredScene>> {
        let book_id = book_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, scene_index, title, summary, original_text, sentence_start, sentence_end
                    FROM scenes WHERE book_id = ?1
                    ORDER BY scene_index
                    "#,
                )?;
                let mut scenes = stmt
                    .query_map([&book_id], |row| {
                        Ok(StoredScene {
                            id: row.get(0)?,
                            scene_index: row.get(1)?,
                            title: row.get(2)?,
                            summary: row.get(3)?,
                            original_text: row.get(4)?,
                            sentence_start: row.get(5)?,
                            sentence_end: row.get(6)?,
                            sentences: Vec::new(),
                            vocabulary: Vec::new(),
                            questions: Vec::new(),
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                for scene in &mut scenes {
                    scene.sentences = Self::load_sentences_sync(conn, scene.id)?;
                    scene.vocabulary = Self::load_vocabulary_sync(conn, scene.id)?;
                    scene.questions = Self::load_questions_sync(conn, scene.id)?;
                }

                Ok(scenes)
            })
            .await
    }

    fn load_sentences_sync(conn: &Connection, scene_id: i64) -> Result<Vec<SentenceRecord>> {
        let mut stmt = conn.prepare(
            "SELECT sentence_index, original_text, translated_text FROM sentences WHERE scene_id = ?1 ORDER BY sentence_index",
        )?;
        let sentences = stmt
            .query_map([scene_id], |row| {
                Ok(SentenceRecord {
                    sentence_index: row.get(0)?,
                    original_text: row.get(1)?,
                    translated_text: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sentences)
    }

    fn load_vocabulary_sync(conn: &Connection, scene_id: i64) -> Result<Vec<VocabularyItem>> {
        let mut stmt = conn.prepare(
            "SELECT term, part_of_speech, definition, example_sentence FROM vocabulary WHERE scene_id = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map([scene_id], |row| {
                Ok(VocabularyItem {
                    term: row.get(0)?,
                    part_of_speech: row.get(1)?,
                    definition: row.get(2)?,
                    example_sentence: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn load_questions_sync(conn: &Connection, scene_id: i64) -> Result<Vec<Question>> {
        let mut stmt = conn.prepare("SELECT id, prompt FROM questions WHERE scene_id = ?1 ORDER BY id")?;
        let headers = stmt
            .query_map([scene_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut options_stmt = conn.prepare(
            "SELECT text, is_correct FROM question_options WHERE question_id = ?1 ORDER BY option_index",
        )?;
        let mut questions = Vec::with_capacity(headers.len());
        for (question_id, prompt) in headers {
            let options = options_stmt
                .query_map([question_id], |row| {
                    Ok(QuestionOption {
                        text: row.get(0)?,
                        is_correct: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            questions.push(Question { prompt, options });
        }
        Ok(questions)
    }

    /// Delete a book and everything it owns; returns whether it existed
    pub async fn delete_book(&self, book_id: &str) -> Result<bool> {
        let book_id = book_id.to_string();

        self.db
            .execute_async(move |conn| {
                // Due to CASCADE, deleting the book deletes its scenes and their children
                let deleted = conn.execute("DELETE FROM books WHERE id = ?1", [&book_id])?;
                Ok(deleted > 0)
            })
            .await
    }
}
