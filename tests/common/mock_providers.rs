/*!
 * Routing provider for end-to-end tests.
 *
 * Answers every prompt of the LLM-backed capabilities with well-formed JSON,
 * chosen from the system prompt, so the full pipeline can run over
 * `LlmServices` without a network.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

use novelscene::errors::ProviderError;
use novelscene::providers::{CompletionRequest, Provider};

/// Which capability a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Translation,
    Classification,
    Vocabulary,
    Questions,
    Unknown,
}

impl PromptKind {
    pub fn of(request: &CompletionRequest) -> Self {
        let system = request.system.as_str();
        if system.contains("literary translator") {
            PromptKind::Translation
        } else if system.contains("segmenting a") {
            PromptKind::Classification
        } else if system.contains("building a vocabulary list") {
            PromptKind::Vocabulary
        } else if system.contains("reading comprehension questions") {
            PromptKind::Questions
        } else {
            PromptKind::Unknown
        }
    }
}

/// Numbered lines "k. text" following the "Sentences (n):" header
fn numbered_lines(prompt: &str) -> Vec<String> {
    let Some(start) = prompt.find("Sentences (") else {
        return Vec::new();
    };
    prompt[start..]
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(". ").map(|(_, text)| text.to_string()))
        .collect()
}

/// Parse "You are analysing chunk k of n."
fn chunk_position(prompt: &str) -> (usize, usize) {
    let header = prompt
        .lines()
        .find(|line| line.starts_with("You are analysing chunk"))
        .unwrap_or("");
    let numbers: Vec<usize> = header
        .trim_end_matches('.')
        .split_whitespace()
        .filter_map(|word| word.parse().ok())
        .collect();
    match numbers.as_slice() {
        [index, total] => (*index, *total),
        _ => (1, 1),
    }
}

/// Provider answering every capability prompt with valid JSON
///
/// Clones share the request log.
#[derive(Debug, Default, Clone)]
pub struct RoutingProvider {
    requests: Arc<Mutex<Vec<PromptKind>>>,
}

impl RoutingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds of every request received, in order
    pub fn requests(&self) -> Vec<PromptKind> {
        self.requests.lock().clone()
    }

    pub fn count(&self, kind: PromptKind) -> usize {
        self.requests.lock().iter().filter(|k| **k == kind).count()
    }

    fn answer(kind: PromptKind, prompt: &str) -> Value {
        match kind {
            PromptKind::Translation => {
                let translations: Vec<String> = numbered_lines(prompt)
                    .into_iter()
                    .map(|sentence| format!("EN: {}", sentence))
                    .collect();
                json!({ "translations": translations })
            }
            PromptKind::Classification => {
                let (index, total) = chunk_position(prompt);
                let count = numbered_lines(prompt).len();
                json!({ "scenes": [{
                    "title": format!("Scene of chunk {}", index),
                    "summary": format!("Events of chunk {}.", index),
                    "start_sentence_index": 1,
                    "end_sentence_index": count,
                    "continues_from_previous": index > 1,
                    "continues_to_next": index < total
                }]})
            }
            PromptKind::Vocabulary => json!({ "vocabulary": [
                {"term": "village", "part_of_speech": "n.", "definition": "village", "example_sentence": "Il était une fois un village."},
                {"term": "boulanger", "part_of_speech": "n.", "definition": "baker"}
            ]}),
            PromptKind::Questions => {
                let questions: Vec<Value> = (1..=4)
                    .map(|n| {
                        json!({
                            "prompt": format!("Question {} ?", n),
                            "options": [
                                {"text": "Oui", "is_correct": true},
                                {"text": "Non", "is_correct": false},
                                {"text": "Peut-être", "is_correct": false},
                                {"text": "Jamais", "is_correct": false}
                            ]
                        })
                    })
                    .collect();
                json!({ "questions": questions })
            }
            PromptKind::Unknown => json!({}),
        }
    }
}

#[async_trait]
impl Provider for RoutingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let kind = PromptKind::of(request);
        self.requests.lock().push(kind);
        // Fenced like real model output
        Ok(format!("```json\n{}\n```", Self::answer(kind, &request.prompt)))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "routing"
    }
}
