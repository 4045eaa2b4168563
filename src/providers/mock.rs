/*!
 * Mock provider and capability implementations for testing.
 *
 * This module provides deterministic, in-process stand-ins:
 * - `MockProvider` - a `Provider` replaying scripted completions
 * - `EchoTranslator` - tags every sentence and records batch sizes
 * - `ScriptedClassifier` - answers each chunk from a closure
 * - `RecordingExerciseGenerator` - fixed payloads, records prompt sizes
 * - `FailingCapability` - every call fails with an API error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ClassificationRequest, CompletionRequest, ExerciseGenerator, Provider, SceneClassifier, Translator};
use crate::errors::ProviderError;
use crate::segmentation::RawSceneProposal;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always returns the same completion
    Replying(String),
    /// Always fails with a server error
    Failing,
}

/// Mock provider replaying completions
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Responses consumed before falling back to `behavior`
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    request_count: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Mutex::new(VecDeque::new()),
            request_count: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A provider that always returns `text`
    pub fn replying(text: &str) -> Self {
        Self::new(MockBehavior::Replying(text.to_string()))
    }

    /// A provider that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A provider returning `responses` in order, then failing
    pub fn scripted(responses: Vec<Result<String, ProviderError>>) -> Self {
        let provider = Self::failing();
        *provider.script.lock() = responses.into();
        provider
    }

    /// Number of completions requested so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }

        match &self.behavior {
            MockBehavior::Replying(text) => Ok(text.clone()),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Replying(_) => Ok(()),
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Translator that prefixes each sentence with `[tr]`
#[derive(Debug, Default)]
pub struct EchoTranslator {
    /// Every batch received, in call order
    batches: Mutex<Vec<Vec<String>>>,
    /// Number of trailing items dropped from every answer
    drop_last: usize,
}

impl EchoTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A translator that returns `count` fewer items than requested
    pub fn dropping_last(count: usize) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            drop_last: count,
        }
    }

    /// Translation produced for `sentence`
    pub fn translation_of(sentence: &str) -> String {
        format!("[tr] {}", sentence)
    }

    /// Batches received so far
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, sentences: &[String]) -> Result<Vec<String>, ProviderError> {
        self.batches.lock().push(sentences.to_vec());
        let keep = sentences.len().saturating_sub(self.drop_last);
        Ok(sentences[..keep].iter().map(|s| Self::translation_of(s)).collect())
    }
}

type ClassifyFn = dyn Fn(&ClassificationRequest) -> Vec<RawSceneProposal> + Send + Sync;

/// Classifier answering every chunk through a closure
pub struct ScriptedClassifier {
    respond: Box<ClassifyFn>,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl std::fmt::Debug for ScriptedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedClassifier")
            .field("requests", &self.requests.lock().len())
            .finish()
    }
}

impl ScriptedClassifier {
    /// Answer each chunk with `respond(request)`
    pub fn new(respond: impl Fn(&ClassificationRequest) -> Vec<RawSceneProposal> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// One scene per chunk covering the whole chunk, continuing the previous one after the first chunk
    pub fn whole_chunk() -> Self {
        Self::new(|request| {
            vec![RawSceneProposal {
                title: Some(format!("Chunk {}", request.chunk_index + 1)),
                summary: Some("Combined summary".to_string()),
                continues_from_previous: request.chunk_index > 0,
                continues_to_next: request.chunk_index + 1 < request.total_chunks,
                ..RawSceneProposal::new(1, request.source_sentences.len() as i64)
            }]
        })
    }

    /// Answer chunk `i` with `responses[i]`, and with nothing past the end
    pub fn from_responses(responses: Vec<Vec<RawSceneProposal>>) -> Self {
        Self::new(move |request| responses.get(request.chunk_index).cloned().unwrap_or_default())
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SceneClassifier for ScriptedClassifier {
    async fn classify_scene_boundaries(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<RawSceneProposal>, ProviderError> {
        self.requests.lock().push(request.clone());
        Ok((self.respond)(request))
    }
}

/// Exercise generator returning fixed payloads
#[derive(Debug, Default)]
pub struct RecordingExerciseGenerator {
    vocabulary: Vec<Value>,
    questions: Vec<Value>,
    /// Size of each vocabulary prompt: scene text plus joined translations
    vocabulary_prompt_sizes: Mutex<Vec<usize>>,
    /// Size of each question prompt: scene text
    question_prompt_sizes: Mutex<Vec<usize>>,
}

impl RecordingExerciseGenerator {
    /// A generator returning no exercise
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator returning the given items on every call
    pub fn with_payloads(vocabulary: Vec<Value>, questions: Vec<Value>) -> Self {
        Self {
            vocabulary,
            questions,
            ..Self::default()
        }
    }

    pub fn vocabulary_prompt_sizes(&self) -> Vec<usize> {
        self.vocabulary_prompt_sizes.lock().clone()
    }

    pub fn question_prompt_sizes(&self) -> Vec<usize> {
        self.question_prompt_sizes.lock().clone()
    }
}

#[async_trait]
impl ExerciseGenerator for RecordingExerciseGenerator {
    async fn extract_vocabulary(
        &self,
        scene_text: &str,
        translated_sentences: &[String],
    ) -> Result<Vec<Value>, ProviderError> {
        let size = scene_text.chars().count() + translated_sentences.join(" ").chars().count();
        self.vocabulary_prompt_sizes.lock().push(size);
        Ok(self.vocabulary.clone())
    }

    async fn generate_questions(&self, scene_text: &str) -> Result<Vec<Value>, ProviderError> {
        self.question_prompt_sizes.lock().push(scene_text.chars().count());
        Ok(self.questions.clone())
    }
}

/// Capability whose every call fails
#[derive(Debug, Default)]
pub struct FailingCapability;

fn simulated_failure() -> ProviderError {
    ProviderError::ApiError {
        status_code: 503,
        message: "Simulated capability failure".to_string(),
    }
}

#[async_trait]
impl Translator for FailingCapability {
    async fn translate(&self, _sentences: &[String]) -> Result<Vec<String>, ProviderError> {
        Err(simulated_failure())
    }
}

#[async_trait]
impl SceneClassifier for FailingCapability {
    async fn classify_scene_boundaries(
        &self,
        _request: &ClassificationRequest,
    ) -> Result<Vec<RawSceneProposal>, ProviderError> {
        Err(simulated_failure())
    }
}

#[async_trait]
impl ExerciseGenerator for FailingCapability {
    async fn extract_vocabulary(&self, _scene_text: &str, _translated: &[String]) -> Result<Vec<Value>, ProviderError> {
        Err(simulated_failure())
    }

    async fn generate_questions(&self, _scene_text: &str) -> Result<Vec<Value>, ProviderError> {
        Err(simulated_failure())
    }
}
