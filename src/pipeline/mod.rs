/*!
 * Document ingestion.
 *
 * - `orchestrator`: end-to-end ingestion from raw text to scene packages
 * - `exercises`: validation of vocabulary and question payloads
 */

pub mod exercises;
pub mod orchestrator;

// Re-export main types
pub use exercises::{ExerciseCollector, ExerciseRejection, Question, QuestionOption, VocabularyItem};
pub use orchestrator::{IngestionOutput, IngestionPipeline, ScenePackage};
