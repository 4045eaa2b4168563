/*!
 * Providers and the capabilities the ingestion pipeline depends on.
 *
 * This module contains:
 * - `Provider`: a chat-completion backend (Ollama, Anthropic)
 * - the capability traits consumed by the pipeline: `Translator`,
 *   `SceneClassifier`, `ExerciseGenerator` and `TextExtractor`
 * - `LlmServices`, which implements every capability on top of a `Provider`
 * - deterministic mocks for tests
 */

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ProviderError;
use crate::segmentation::RawSceneProposal;

/// A single completion request, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions for the model
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with the default sampling settings
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Common trait for all LLM providers
///
/// Implementations perform exactly one HTTP exchange per call; retrying is
/// left to the caller.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request and return the generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name used in log messages
    fn name(&self) -> &str;
}

/// Everything the classifier sees for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub source_sentences: Vec<String>,
    pub translated_sentences: Vec<String>,
    /// Zero-based chunk position
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Summary of the last accepted scene, for continuity across chunks
    pub previous_summary: Option<String>,
}

/// Reads the full text of a source document
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> anyhow::Result<String>;
}

/// Order-preserving sentence translation
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `sentences`; the result should have the same length and order
    async fn translate(&self, sentences: &[String]) -> Result<Vec<String>, ProviderError>;
}

/// Scene boundary classification over one chunk
#[async_trait]
pub trait SceneClassifier: Send + Sync {
    async fn classify_scene_boundaries(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<RawSceneProposal>, ProviderError>;
}

/// Vocabulary and question generation for a scene
///
/// Items come back as raw JSON; validation happens in the pipeline.
#[async_trait]
pub trait ExerciseGenerator: Send + Sync {
    async fn extract_vocabulary(
        &self,
        scene_text: &str,
        translated_sentences: &[String],
    ) -> Result<Vec<Value>, ProviderError>;

    async fn generate_questions(&self, scene_text: &str) -> Result<Vec<Value>, ProviderError>;
}

pub mod anthropic;
pub mod llm;
pub mod mock;
pub mod ollama;
pub mod prompts;
