/*!
 * Sentence chunking for boundary classification.
 *
 * Aligned source/translation sentences are grouped into windows sized for one
 * classifier call. Consecutive windows share a short tail of sentences so the
 * classifier sees where the previous window ended.
 */

use super::types::SentenceChunk;

/// Lower bound applied to the nominal token budget
pub const MIN_CHUNK_TOKENS: usize = 128;

/// Approximate characters per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Sizing of classifier chunks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkingOptions {
    /// Nominal chunk size in tokens
    pub max_tokens: usize,
    /// Share of a chunk's sentences repeated at the start of the next chunk
    pub overlap_ratio: f64,
    /// Hard character cap; the nominal size is used when absent or zero
    pub max_chunk_chars: Option<usize>,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_ratio: 0.1,
            max_chunk_chars: None,
        }
    }
}

impl ChunkingOptions {
    /// Soft size in characters at which a chunk is closed
    pub fn nominal_chars(&self) -> usize {
        self.max_tokens.max(MIN_CHUNK_TOKENS) * CHARS_PER_TOKEN
    }

    /// Hard character cap
    pub fn cap_chars(&self) -> usize {
        match self.max_chunk_chars {
            Some(cap) if cap > 0 => cap,
            _ => self.nominal_chars(),
        }
    }
}

/// Characters a sentence counts for: its translation if present, else the source, at least 1
fn measure(source: &str, translated: &str) -> usize {
    let chars = if translated.is_empty() {
        source.chars().count()
    } else {
        translated.chars().count()
    };
    chars.max(1)
}

fn translation_at(translated: &[String], index: usize) -> String {
    translated.get(index).cloned().unwrap_or_default()
}

/// Group aligned sentences into overlapping, character-bounded chunks.
///
/// Every chunk holds at least one sentence; a chunk only exceeds the cap when
/// its single sentence does. A missing translation counts as an empty string.
pub fn chunk_sentence_pairs(
    source: &[String],
    translated: &[String],
    options: &ChunkingOptions,
) -> Vec<SentenceChunk> {
    let total = source.len();
    if total == 0 {
        return Vec::new();
    }

    let nominal = options.nominal_chars();
    let cap = options.cap_chars();
    let overlap_ratio = options.overlap_ratio.clamp(0.0, 1.0);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let mut end = start;
        let mut measured = 0;

        while end < total {
            let size = measure(&source[end], translated.get(end).map_or("", String::as_str));
            if end > start && measured + size > cap {
                break;
            }
            measured += size;
            end += 1;
            if measured >= nominal {
                break;
            }
        }

        chunks.push(SentenceChunk {
            index: chunks.len(),
            sentence_start: start,
            sentence_end: end,
            source_sentences: source[start..end].to_vec(),
            translated_sentences: (start..end).map(|i| translation_at(translated, i)).collect(),
            char_count: measured,
        });

        if end >= total {
            break;
        }

        let overlap = ((end - start) as f64 * overlap_ratio) as usize;
        start = end.saturating_sub(overlap).max(start + 1).min(total);
    }

    if chunks.is_empty() {
        chunks.push(single_chunk(source, translated));
    }

    chunks
}

/// One chunk covering every sentence
pub fn single_chunk(source: &[String], translated: &[String]) -> SentenceChunk {
    let char_count = source
        .iter()
        .enumerate()
        .map(|(i, sentence)| measure(sentence, translated.get(i).map_or("", String::as_str)))
        .sum();

    SentenceChunk {
        index: 0,
        sentence_start: 0,
        sentence_end: source.len(),
        source_sentences: source.to_vec(),
        translated_sentences: (0..source.len()).map(|i| translation_at(translated, i)).collect(),
        char_count,
    }
}
