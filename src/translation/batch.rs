/*!
 * Batch translation of sentences.
 *
 * Sentences are grouped greedily into batches bounded by a character budget
 * and an item budget, then sent to the translator one batch at a time. The
 * result is always aligned 1:1 with the input.
 */

use log::{debug, warn};
use std::ops::Range;

use crate::errors::ProviderError;
use crate::providers::Translator;

/// Separator counted between sentences of a batch
const SEPARATOR_CHARS: usize = 1;

/// Plan batch boundaries over `sentences`.
///
/// A batch holds at most `max_items` sentences and at most `max_chars`
/// characters, counting one separator between consecutive sentences. A
/// sentence is never split; one longer than the budget forms its own batch.
pub fn plan_batches(sentences: &[String], max_chars: usize, max_items: usize) -> Vec<Range<usize>> {
    let max_items = max_items.max(1);
    let mut batches = Vec::new();
    let mut start = 0;
    let mut batch_chars = 0;

    for (index, sentence) in sentences.iter().enumerate() {
        let chars = sentence.chars().count();
        let count = index - start;
        let grown = if count == 0 { chars } else { batch_chars + SEPARATOR_CHARS + chars };

        if count > 0 && (grown > max_chars || count >= max_items) {
            batches.push(start..index);
            start = index;
            batch_chars = chars;
        } else {
            batch_chars = grown;
        }
    }

    if start < sentences.len() {
        batches.push(start..sentences.len());
    }

    batches
}

/// Translates whole documents through a `Translator`, batch by batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationBatcher {
    /// Character budget of a batch
    pub max_chars: usize,
    /// Item budget of a batch
    pub max_items: usize,
}

impl TranslationBatcher {
    /// Create a new batcher
    pub fn new(max_chars: usize, max_items: usize) -> Self {
        Self { max_chars, max_items }
    }

    /// Translate `sentences`, returning exactly one translation per sentence.
    ///
    /// Short answers are padded with empty strings and extra items are
    /// dropped. A translator failure aborts the whole call.
    pub async fn translate_all(
        &self,
        translator: &dyn Translator,
        sentences: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let batches = plan_batches(sentences, self.max_chars, self.max_items);
        let mut translated = Vec::with_capacity(sentences.len());

        for (batch_index, range) in batches.iter().enumerate() {
            let batch = &sentences[range.clone()];
            debug!(
                "Translating batch {}/{} ({} sentences)",
                batch_index + 1,
                batches.len(),
                batch.len()
            );

            let mut results = translator.translate(batch).await?;
            if results.len() != batch.len() {
                warn!(
                    "Batch {} returned {} translations for {} sentences",
                    batch_index + 1,
                    results.len(),
                    batch.len()
                );
            }
            results.resize(batch.len(), String::new());
            translated.extend(results);
        }

        Ok(translated)
    }
}
