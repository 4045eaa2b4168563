/*!
 * Prompt segment rebalancing.
 *
 * A finished scene can be far larger than what one vocabulary or question
 * prompt may carry. Its sentence/translation pairs are regrouped into
 * segments whose combined size stays under a character cap.
 */

/// Smallest effective cap the rebalancer shrinks to
pub const MIN_EFFECTIVE_CAP: usize = 128;

/// Consecutive sentences of a scene sent together in one exercise prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSegment {
    pub sentences: Vec<String>,
    pub translations: Vec<String>,
}

impl PromptSegment {
    /// Source sentences joined by single spaces
    pub fn source_text(&self) -> String {
        self.sentences.join(" ")
    }

    /// Translations joined by single spaces
    pub fn translated_text(&self) -> String {
        self.translations.join(" ")
    }

    /// Size of the prompt payload: source text plus joined translations
    pub fn char_count(&self) -> usize {
        joined_chars(&self.sentences) + joined_chars(&self.translations)
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

fn joined_chars(parts: &[String]) -> usize {
    let chars: usize = parts.iter().map(|part| part.chars().count()).sum();
    chars + parts.len().saturating_sub(1)
}

/// Shorten `text` to at most `limit` chars, cutting at the last space when there is one
fn truncate_at_space(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut = text.char_indices().nth(limit).map_or(text.len(), |(offset, _)| offset);
    let head = &text[..cut];
    match head.rfind(' ') {
        Some(space) if space > 0 => head[..space].trim_end().to_string(),
        _ => head.to_string(),
    }
}

/// Greedily group pairs into segments of at most `cap` chars.
///
/// A translation that would not fit next to its own sentence is shortened.
/// A segment only exceeds `cap` when its single source sentence does.
pub fn group_pairs(pairs: &[(String, String)], cap: usize) -> Vec<PromptSegment> {
    let mut segments = Vec::new();
    let mut current = PromptSegment::default();
    let mut source_chars = 0usize;
    let mut translated_chars = 0usize;

    for (sentence, translation) in pairs {
        let sentence_chars = sentence.chars().count();
        let allowance = cap.saturating_sub(sentence_chars);
        let translation = truncate_at_space(translation, allowance);
        let translation_chars = translation.chars().count();

        let separator = usize::from(!current.is_empty());
        let grown = source_chars + separator + sentence_chars + translated_chars + separator + translation_chars;
        if !current.is_empty() && grown > cap {
            segments.push(std::mem::take(&mut current));
            source_chars = 0;
            translated_chars = 0;
        }

        let separator = usize::from(!current.is_empty());
        source_chars += separator + sentence_chars;
        translated_chars += separator + translation_chars;
        current.sentences.push(sentence.clone());
        current.translations.push(translation);
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Group pairs under `cap`, halving the effective cap until every segment fits.
///
/// The effective cap never drops below `max(128, cap / 8)`, which bounds the
/// number of attempts.
pub fn rebalance(pairs: &[(String, String)], cap: usize) -> Vec<PromptSegment> {
    let floor = MIN_EFFECTIVE_CAP.max(cap / 8);
    let mut effective = cap;

    loop {
        let segments = group_pairs(pairs, effective);
        if effective <= floor || segments.iter().all(|segment| segment.char_count() <= cap) {
            return segments;
        }
        effective = (effective / 2).max(floor);
    }
}
