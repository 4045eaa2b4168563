/*!
 * Data types shared by the segmentation stages.
 */

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A window of consecutive sentences sent to the boundary classifier in one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceChunk {
    /// Position of the chunk in the chunk sequence
    pub index: usize,
    /// Global index of the first sentence (inclusive)
    pub sentence_start: usize,
    /// Global index one past the last sentence (exclusive)
    pub sentence_end: usize,
    /// Source-language sentences of the window
    pub source_sentences: Vec<String>,
    /// Aligned translations, empty where a translation is missing
    pub translated_sentences: Vec<String>,
    /// Measured size of the chunk in characters
    pub char_count: usize,
}

impl SentenceChunk {
    /// Number of sentences in the window
    pub fn len(&self) -> usize {
        self.sentence_end - self.sentence_start
    }

    /// Whether the window holds no sentence
    pub fn is_empty(&self) -> bool {
        self.sentence_end == self.sentence_start
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_flag(&Value::deserialize(deserializer)?))
}

/// Interpret a loosely typed JSON value as a boolean flag
pub fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(number) => number.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// One scene proposed by the classifier for a chunk.
///
/// Indices are 1-based and chunk-local. Nothing in here is trusted until
/// `validate` accepted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSceneProposal {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,

    #[serde(default)]
    pub start_sentence_index: Option<Value>,

    #[serde(default)]
    pub end_sentence_index: Option<Value>,

    #[serde(default, deserialize_with = "lenient_flag")]
    pub continues_from_previous: bool,

    #[serde(default, deserialize_with = "lenient_flag")]
    pub continues_to_next: bool,
}

impl RawSceneProposal {
    /// Proposal spanning 1-based chunk-local sentences `start..=end`
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start_sentence_index: Some(Value::from(start)),
            end_sentence_index: Some(Value::from(end)),
            ..Default::default()
        }
    }

    /// Set the classifier title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the classifier summary
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    /// Mark the proposal as continuing the previous scene
    pub fn continuing_from_previous(mut self) -> Self {
        self.continues_from_previous = true;
        self
    }

    /// Mark the proposal as continuing into the next chunk
    pub fn continuing_to_next(mut self) -> Self {
        self.continues_to_next = true;
        self
    }

    /// Parse a proposal out of an untyped JSON item
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Check the proposal against a chunk of `sentence_count` sentences.
    ///
    /// Returns the 0-based, chunk-local `(start, end)` pair, both inclusive.
    pub fn validate(&self, sentence_count: usize) -> Result<(usize, usize), ProposalRejection> {
        let start = parse_index(self.start_sentence_index.as_ref(), "start_sentence_index")?;
        let end = parse_index(self.end_sentence_index.as_ref(), "end_sentence_index")?;

        if start < 1 {
            return Err(ProposalRejection::StartBeforeFirst { start });
        }
        if end < start {
            return Err(ProposalRejection::EndBeforeStart { start, end });
        }
        if end > sentence_count as i64 {
            return Err(ProposalRejection::EndPastChunk { end, sentence_count });
        }

        Ok(((start - 1) as usize, (end - 1) as usize))
    }

    /// Trimmed, non-empty summary
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().map(str::trim).filter(|summary| !summary.is_empty())
    }
}

/// Parse an index given as a JSON integer or a numeric string
fn parse_index(value: Option<&Value>, field: &'static str) -> Result<i64, ProposalRejection> {
    let value = match value {
        None | Some(Value::Null) => return Err(ProposalRejection::MissingIndex { field }),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ProposalRejection::InvalidIndex {
        field,
        raw: value.to_string(),
    })
}

/// Why a classifier proposal was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalRejection {
    #[error("missing {field}")]
    MissingIndex { field: &'static str },

    #[error("{field} is not an integer: {raw}")]
    InvalidIndex { field: &'static str, raw: String },

    #[error("start index {start} is below 1")]
    StartBeforeFirst { start: i64 },

    #[error("end index {end} precedes start index {start}")]
    EndBeforeStart { start: i64, end: i64 },

    #[error("end index {end} exceeds the {sentence_count} sentences of the chunk")]
    EndPastChunk { end: i64, sentence_count: usize },

    #[error("global range ends at {global_end} but the document has {sentence_count} sentences")]
    OutsideDocument { global_end: usize, sentence_count: usize },

    #[error("sentences {start}..={end} are already claimed up to {high_water_mark}")]
    AlreadyClaimed {
        start: usize,
        end: usize,
        high_water_mark: usize,
    },

    #[error("sentences {start}..={end} hold no text")]
    EmptyContent { start: usize, end: usize },
}

/// A scene accepted into the running sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledScene {
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Exact cleaned-text substring covered by the scene, trimmed
    pub content: String,
    /// Global index of the first sentence (inclusive)
    pub sentence_start: usize,
    /// Global index of the last sentence (inclusive)
    pub sentence_end: usize,
}

/// A reconciled scene together with the classifier's continuation flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCandidate {
    pub scene: ReconciledScene,
    pub continues_from_previous: bool,
    pub continues_to_next: bool,
}

/// One sentence of a finalized scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSentence {
    /// Position within the scene, 1-based
    pub index: usize,
    pub original_text: String,
    pub translated_text: String,
}

/// A scene after merging, with its sentences and title materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalScene {
    /// Position within the book, 1-based
    pub index: usize,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub sentence_start: usize,
    pub sentence_end: usize,
    pub sentences: Vec<SceneSentence>,
}
