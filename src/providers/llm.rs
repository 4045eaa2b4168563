/*!
 * LLM-backed capabilities.
 *
 * `LlmServices` implements translation, scene classification and exercise
 * generation on top of any `Provider`. It owns the retry policy of these
 * capabilities: transient provider failures are retried with exponential
 * backoff, everything else is returned to the caller.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;

use super::prompts::{PromptBuilder, QUESTIONS_KEY, SCENES_KEY, TRANSLATIONS_KEY, VOCABULARY_KEY};
use super::{
    ClassificationRequest, CompletionRequest, ExerciseGenerator, Provider, SceneClassifier, Translator,
};
use crate::errors::ProviderError;
use crate::segmentation::RawSceneProposal;

/// Largest shift applied to the backoff base
const MAX_BACKOFF_SHIFT: u32 = 10;

/// Retry settings for capability calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub retry_count: u32,
    /// Base delay, doubled after every failed attempt
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(1u64 << attempt.min(MAX_BACKOFF_SHIFT)))
    }
}

/// Locate and parse the JSON object in a completion.
///
/// Accepts bare JSON, fenced code blocks and JSON surrounded by prose.
pub fn extract_json(text: &str) -> Result<Value, ProviderError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let candidates = [trimmed.find('{').zip(trimmed.rfind('}')), trimmed.find('[').zip(trimmed.rfind(']'))];
    for (start, end) in candidates.into_iter().flatten() {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    let preview: String = trimmed.chars().take(200).collect();
    Err(ProviderError::ParseError(format!("No JSON found in completion: {}", preview)))
}

/// Take the array stored under `key`.
///
/// A missing or non-array value is a malformed response and yields an empty
/// list. A bare top-level array is accepted as the list itself.
pub fn take_list(payload: Value, key: &str) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!("Response field '{}' is not a list ({}), ignoring it", key, other);
                Vec::new()
            }
            None => {
                warn!("Response is missing the '{}' list", key);
                Vec::new()
            }
        },
        other => {
            warn!("Expected a JSON object with '{}', got {}", key, other);
            Vec::new()
        }
    }
}

/// All LLM-backed capabilities over one provider
#[derive(Debug)]
pub struct LlmServices<P: Provider> {
    provider: P,
    prompts: PromptBuilder,
    retry: RetryPolicy,
}

impl<P: Provider> LlmServices<P> {
    /// Create the services
    pub fn new(provider: P, prompts: PromptBuilder, retry: RetryPolicy) -> Self {
        Self { provider, prompts, retry }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Complete a request, retrying transient failures
    pub async fn complete_with_retry(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.provider.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.retry.retry_count => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        "{} request failed: {} - attempt {}/{}, retrying in {} ms",
                        self.provider.name(),
                        e,
                        attempt + 1,
                        self.retry.retry_count + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_list(&self, request: CompletionRequest, key: &str) -> Result<Vec<Value>, ProviderError> {
        let text = self.complete_with_retry(&request).await?;
        let payload = extract_json(&text)?;
        Ok(take_list(payload, key))
    }
}

#[async_trait]
impl<P: Provider> Translator for LlmServices<P> {
    async fn translate(&self, sentences: &[String]) -> Result<Vec<String>, ProviderError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }
        let items = self
            .request_list(self.prompts.translation(sentences), TRANSLATIONS_KEY)
            .await?;
        if items.len() != sentences.len() {
            warn!(
                "Translator returned {} items for {} sentences",
                items.len(),
                sentences.len()
            );
        }

        Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text.trim().to_string(),
                _ => String::new(),
            })
            .collect())
    }
}

#[async_trait]
impl<P: Provider> SceneClassifier for LlmServices<P> {
    async fn classify_scene_boundaries(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Vec<RawSceneProposal>, ProviderError> {
        let items = self
            .request_list(self.prompts.classification(request), SCENES_KEY)
            .await?;
        let total = items.len();
        let proposals: Vec<RawSceneProposal> = items.into_iter().filter_map(RawSceneProposal::from_value).collect();
        if proposals.len() < total {
            debug!(
                "Chunk {}: skipped {} non-object scene items",
                request.chunk_index,
                total - proposals.len()
            );
        }
        Ok(proposals)
    }
}

#[async_trait]
impl<P: Provider> ExerciseGenerator for LlmServices<P> {
    async fn extract_vocabulary(
        &self,
        scene_text: &str,
        translated_sentences: &[String],
    ) -> Result<Vec<Value>, ProviderError> {
        self.request_list(self.prompts.vocabulary(scene_text, translated_sentences), VOCABULARY_KEY)
            .await
    }

    async fn generate_questions(&self, scene_text: &str) -> Result<Vec<Value>, ProviderError> {
        self.request_list(self.prompts.questions(scene_text), QUESTIONS_KEY)
            .await
    }
}
