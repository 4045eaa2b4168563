/*!
 * Validation of vocabulary and question payloads.
 *
 * Exercise generators return loosely shaped JSON. Items that do not meet the
 * expected shape are discarded with a typed reason and never abort ingestion.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::segmentation::types::value_as_flag;

/// Options required on every question
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A vocabulary entry attached to a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub term: String,
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub example_sentence: Option<String>,
}

/// One answer choice of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

/// A multiple choice comprehension question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// The correct option
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.is_correct)
    }
}

/// Why an exercise item was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExerciseRejection {
    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("vocabulary item has no term")]
    MissingTerm,

    #[error("question has no prompt")]
    MissingPrompt,

    #[error("question options are not a list")]
    MissingOptions,

    #[error("question has {0} usable options instead of 4")]
    WrongOptionCount(usize),

    #[error("question has {0} correct options instead of 1")]
    WrongCorrectCount(usize),
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Parse one vocabulary item; optional fields only accept strings
pub fn parse_vocabulary_item(value: &Value) -> Result<VocabularyItem, ExerciseRejection> {
    let map = value.as_object().ok_or(ExerciseRejection::NotAnObject)?;
    let term = text_field(map, "term").ok_or(ExerciseRejection::MissingTerm)?;

    Ok(VocabularyItem {
        term,
        part_of_speech: text_field(map, "part_of_speech"),
        definition: text_field(map, "definition"),
        example_sentence: text_field(map, "example_sentence"),
    })
}

/// Parse one question.
///
/// Options without text are skipped and only the first four usable ones are
/// considered. Exactly four must remain, exactly one of them correct.
pub fn parse_question(value: &Value) -> Result<Question, ExerciseRejection> {
    let map = value.as_object().ok_or(ExerciseRejection::NotAnObject)?;
    let prompt = text_field(map, "prompt").ok_or(ExerciseRejection::MissingPrompt)?;
    let raw_options = map
        .get("options")
        .and_then(Value::as_array)
        .ok_or(ExerciseRejection::MissingOptions)?;

    let options: Vec<QuestionOption> = raw_options
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|option| {
            text_field(option, "text").map(|text| QuestionOption {
                text,
                is_correct: option.get("is_correct").is_some_and(value_as_flag),
            })
        })
        .take(OPTIONS_PER_QUESTION)
        .collect();

    if options.len() != OPTIONS_PER_QUESTION {
        return Err(ExerciseRejection::WrongOptionCount(options.len()));
    }
    let correct = options.iter().filter(|option| option.is_correct).count();
    if correct != 1 {
        return Err(ExerciseRejection::WrongCorrectCount(correct));
    }

    Ok(Question { prompt, options })
}

/// Accumulates validated exercises for one scene across prompt segments
#[derive(Debug, Clone, Default)]
pub struct ExerciseCollector {
    max_questions: usize,
    vocabulary: Vec<VocabularyItem>,
    seen_terms: HashSet<String>,
    questions: Vec<Question>,
    rejections: Vec<ExerciseRejection>,
}

impl ExerciseCollector {
    /// Create a collector keeping at most `max_questions` questions
    pub fn new(max_questions: usize) -> Self {
        Self {
            max_questions,
            ..Self::default()
        }
    }

    /// Whether the question quota is filled
    pub fn questions_full(&self) -> bool {
        self.questions.len() >= self.max_questions
    }

    /// Add vocabulary items, skipping terms already seen (case-insensitive)
    pub fn add_vocabulary(&mut self, items: &[Value]) {
        for item in items {
            match parse_vocabulary_item(item) {
                Ok(entry) => {
                    if self.seen_terms.insert(entry.term.to_lowercase()) {
                        self.vocabulary.push(entry);
                    }
                }
                Err(rejection) => self.rejections.push(rejection),
            }
        }
    }

    /// Add questions until the quota is filled
    ///
    /// Only the first `max_questions` items of a payload are considered.
    pub fn add_questions(&mut self, items: &[Value]) {
        for item in items.iter().take(self.max_questions) {
            if self.questions_full() {
                break;
            }
            match parse_question(item) {
                Ok(question) => self.questions.push(question),
                Err(rejection) => self.rejections.push(rejection),
            }
        }
    }

    /// Discard reasons recorded so far
    pub fn rejections(&self) -> &[ExerciseRejection] {
        &self.rejections
    }

    /// Validated vocabulary and questions
    pub fn finish(self) -> (Vec<VocabularyItem>, Vec<Question>) {
        (self.vocabulary, self.questions)
    }
}
