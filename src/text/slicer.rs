/*!
 * Sentence slicing with exact offset tracking.
 *
 * The cleaned text is cut into paragraphs (blank-line delimited) and then into
 * sentences. Every slice records the byte range it occupies in the cleaned
 * text, so any run of consecutive slices can be mapped back to the exact
 * source substring. Sentences longer than the unit budget are cut into
 * sub-segments that keep contiguous offsets and their paragraph index.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r\f]*\n").unwrap());

static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?!]\s+").unwrap());

/// Share of the window below which a forced break is not taken
const MIN_BREAK_RATIO_NUMERATOR: usize = 3;
const MIN_BREAK_RATIO_DENOMINATOR: usize = 10;

/// One sentence (or forced sub-segment) of the cleaned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSlice {
    /// Sentence text, equal to `source[start..end]`
    pub text: String,
    /// Byte offset of the first character in the cleaned text
    pub start: usize,
    /// Byte offset one past the last character in the cleaned text
    pub end: usize,
    /// Index of the paragraph the sentence belongs to
    pub paragraph_index: usize,
}

/// Split `text` into sentences at `.`, `?` or `!` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<&str> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut from = 0;
    for boundary in SENTENCE_BOUNDARY_REGEX.find_iter(stripped) {
        // Punctuation is a single ASCII byte
        let piece = stripped[from..boundary.start() + 1].trim();
        if !piece.is_empty() {
            sentences.push(piece);
        }
        from = boundary.end();
    }
    let tail = stripped[from..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Split `text` into trimmed paragraphs
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK_REGEX
        .split(text)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

/// Locate `needle` in `source` at or after `cursor`, falling back to a search
/// from the beginning when whitespace normalization moved it out of reach.
fn locate(source: &str, needle: &str, cursor: usize) -> Option<usize> {
    source
        .get(cursor..)
        .and_then(|rest| rest.find(needle))
        .map(|offset| cursor + offset)
        .or_else(|| source.find(needle))
}

/// Narrow a byte range so that it excludes surrounding whitespace
fn trimmed_range(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let segment = &source[start..end];
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return None;
    }
    let leading = segment.len() - segment.trim_start().len();
    Some((start + leading, start + leading + trimmed.len()))
}

fn push_slice(out: &mut Vec<SentenceSlice>, source: &str, start: usize, end: usize, paragraph_index: usize) {
    if let Some((start, end)) = trimmed_range(source, start, end) {
        out.push(SentenceSlice {
            text: source[start..end].to_string(),
            start,
            end,
            paragraph_index,
        });
    }
}

/// Cut `source[start..end]` into pieces of at most `max_chars` characters,
/// breaking at the last space or newline found in the final 70% of each window
/// or right after it.
fn push_bounded(
    out: &mut Vec<SentenceSlice>,
    source: &str,
    start: usize,
    end: usize,
    paragraph_index: usize,
    max_chars: usize,
) {
    let sentence = &source[start..end];
    // Byte offset of every char boundary, including the end
    let boundaries: Vec<usize> = sentence
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(sentence.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    if max_chars == 0 || total_chars <= max_chars {
        push_slice(out, source, start, end, paragraph_index);
        return;
    }

    let min_window = (max_chars * MIN_BREAK_RATIO_NUMERATOR / MIN_BREAK_RATIO_DENOMINATOR).max(1);
    let mut from = 0;
    while from < total_chars {
        let mut to = (from + max_chars).min(total_chars);
        if to < total_chars {
            let earliest = from + min_window;
            let break_at = (earliest..=to)
                .rev()
                .find(|&index| matches!(sentence[boundaries[index]..].chars().next(), Some(' ' | '\n')));
            if let Some(index) = break_at {
                to = index;
            }
        }
        push_slice(
            out,
            source,
            start + boundaries[from],
            start + boundaries[to],
            paragraph_index,
        );
        from = to;
    }
}

/// Build the ordered, offset-tracked sentence list for `source`.
///
/// Slices come out in non-decreasing `start` order with non-decreasing
/// paragraph indices, and `slice.text == source[slice.start..slice.end]`.
/// No slice is longer than `max_unit_chars` characters unless no sentence
/// boundary was found at all, in which case the whole trimmed text is one slice.
pub fn build_sentence_slices(source: &str, max_unit_chars: usize) -> Vec<SentenceSlice> {
    let mut slices = Vec::new();
    let mut cursor = 0;

    for (paragraph_index, paragraph) in split_paragraphs(source).into_iter().enumerate() {
        for sentence in split_sentences(paragraph) {
            let Some(start) = locate(source, sentence, cursor) else {
                continue;
            };
            let end = start + sentence.len();
            push_bounded(&mut slices, source, start, end, paragraph_index, max_unit_chars);
            cursor = end;
        }
    }

    if !slices.is_empty() {
        return slices;
    }

    let stripped = source.trim();
    if stripped.is_empty() {
        return slices;
    }
    let start = source.find(stripped).unwrap_or(0);
    vec![SentenceSlice {
        text: stripped.to_string(),
        start,
        end: start + stripped.len(),
        paragraph_index: 0,
    }]
}
