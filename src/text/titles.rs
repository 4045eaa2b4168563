/*!
 * Scene title synthesis.
 *
 * Headings removed by the stripper are attached to the first sentence that
 * follows them. A scene inherits the closest heading at or before its first
 * sentence; that heading is combined with the classifier's title when both
 * carry information.
 */

use super::headings::HeadingInfo;
use super::slicer::SentenceSlice;

/// Number of words kept when a title is derived from the first sentence
pub const FALLBACK_TITLE_WORDS: usize = 8;

/// Headings keyed by the global index of the first sentence they precede
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    entries: Vec<(usize, String)>,
}

impl HeadingIndex {
    /// Associate every heading with the first sentence starting at or after its offset.
    ///
    /// Headings with no following sentence are dropped.
    pub fn build(headings: &[HeadingInfo], slices: &[SentenceSlice]) -> Self {
        let mut entries: Vec<(usize, String)> = headings
            .iter()
            .filter_map(|heading| {
                let sentence_index = slices.partition_point(|slice| slice.start < heading.char_index);
                (sentence_index < slices.len()).then(|| (sentence_index, heading.text.clone()))
            })
            .collect();
        entries.sort_by_key(|(sentence_index, _)| *sentence_index);
        Self { entries }
    }

    /// Number of associated headings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no heading was associated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last heading placed at or before `scene_start`
    pub fn heading_for(&self, scene_start: usize) -> Option<&str> {
        let upto = self.entries.partition_point(|(sentence_index, _)| *sentence_index <= scene_start);
        upto.checked_sub(1).map(|last| self.entries[last].1.as_str())
    }
}

fn is_all_uppercase(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && text == text.to_uppercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Normalize heading casing for display.
///
/// All-uppercase headings of several words are title-cased, except words of
/// three letters or fewer which are kept verbatim (roman numerals, acronyms).
pub fn format_heading(heading: &str) -> String {
    let trimmed = heading.trim();
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 || !is_all_uppercase(trimmed) {
        return words.join(" ");
    }

    words
        .iter()
        .map(|word| {
            let letters = word.chars().filter(|c| c.is_alphabetic()).count();
            if letters <= 3 {
                (*word).to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a classifier title carries no information ("Scene 3", "scene")
pub fn is_generic_title(title: &str) -> bool {
    title.trim().to_lowercase().starts_with("scene")
}

/// Sentence-cased title built from the first words of a sentence, or `None` if it has no words
pub fn title_from_sentence(sentence: &str) -> Option<String> {
    let words: Vec<&str> = sentence.split_whitespace().take(FALLBACK_TITLE_WORDS).collect();
    if words.is_empty() {
        return None;
    }
    let joined = words.join(" ");
    let trimmed = joined.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '…'));
    if trimmed.is_empty() {
        return None;
    }
    // An all-caps opening is shouting, not a title
    let shouting = !trimmed.chars().any(char::is_lowercase);
    let body = if shouting { trimmed.to_lowercase() } else { trimmed.to_string() };
    let mut chars = body.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
}

/// Pick the final title for scene number `scene_number` (1-based).
///
/// Precedence: `"<heading>: <title>"` when a non-generic classifier title does
/// not already contain the heading; the heading alone; the classifier title;
/// the first words of the opening sentence; `"Scene <n>"`.
pub fn synthesize_title(
    classifier_title: Option<&str>,
    heading: Option<&str>,
    first_sentence: &str,
    scene_number: usize,
) -> String {
    let classifier_title = classifier_title.map(str::trim).filter(|title| !title.is_empty());
    let heading = heading.map(format_heading).filter(|heading| !heading.is_empty());

    match (classifier_title, heading) {
        (Some(title), Some(heading)) if !is_generic_title(title) => {
            if title.to_lowercase().contains(&heading.to_lowercase()) {
                title.to_string()
            } else {
                format!("{}: {}", heading, title)
            }
        }
        (_, Some(heading)) => heading,
        (Some(title), None) => title.to_string(),
        (None, None) => title_from_sentence(first_sentence)
            .unwrap_or_else(|| format!("Scene {}", scene_number)),
    }
}

/// Title synthesizer bound to one document's headings
#[derive(Debug, Clone, Default)]
pub struct TitleSynthesizer {
    headings: HeadingIndex,
}

impl TitleSynthesizer {
    /// Create a synthesizer for the given headings and sentence slices
    pub fn new(headings: &[HeadingInfo], slices: &[SentenceSlice]) -> Self {
        Self {
            headings: HeadingIndex::build(headings, slices),
        }
    }

    /// Title for a scene starting at global sentence `scene_start`
    pub fn title_for(
        &self,
        classifier_title: Option<&str>,
        scene_start: usize,
        first_sentence: &str,
        scene_number: usize,
    ) -> String {
        synthesize_title(
            classifier_title,
            self.headings.heading_for(scene_start),
            first_sentence,
            scene_number,
        )
    }
}
