/*!
 * Heading detection and removal.
 *
 * Extracted book text carries chapter and part headings on their own lines.
 * They are removed before sentence slicing so they never leak into a scene,
 * but their positions are kept so scene titles can refer to them later.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// Ordinals and cardinals accepted after a chapter/part label
const NUMBER_WORDS: &str = "un|une|deux|trois|quatre|cinq|six|sept|huit|neuf|dix|onze|douze|treize|quatorze|quinze|seize|vingt|trente|premier|première|second|seconde|deuxième|troisième|quatrième|cinquième|sixième|septième|huitième|neuvième|dixième|dernier|dernière|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|last";

// A numbered chapter/part label, with an optional short subtitle that is not a sentence
static LABEL_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(chapter|chapitre|part|partie|book|livre|volume|tome)\s+([0-9]+|(?-i:[IVXLCDM]+)|{})\.?(\s*[:.\-–—]\s*[^.!?]{{1,60}})?$",
        NUMBER_WORDS
    ))
    .unwrap()
});

static STANDALONE_HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(prologue|epilogue|épilogue|préface|preface|introduction)\.?$").unwrap());

static NUMERAL_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?$").unwrap());

static ROMAN_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVXLCDM]+\.?$").unwrap());

/// Maximum length of a line accepted as an uppercase heading
pub const MAX_UPPERCASE_HEADING_CHARS: usize = 80;

/// A heading removed from the text, positioned in the cleaned output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingInfo {
    /// Heading text as it appeared (trimmed)
    pub text: String,
    /// Byte offset in the cleaned text where the content following the heading starts
    pub char_index: usize,
}

/// Whether a trimmed, non-blank line looks like a heading
pub fn is_heading_line(line: &str) -> bool {
    if LABEL_HEADING_REGEX.is_match(line)
        || STANDALONE_HEADING_REGEX.is_match(line)
        || NUMERAL_HEADING_REGEX.is_match(line)
        || ROMAN_HEADING_REGEX.is_match(line)
    {
        return true;
    }

    line.chars().count() <= MAX_UPPERCASE_HEADING_CHARS
        && line.chars().any(char::is_alphabetic)
        && line == line.to_uppercase()
}

/// Remove isolated heading lines from `text`.
///
/// A line is only removed when it is surrounded by blank lines (or the start/end
/// of the text), so a heading-like line inside a paragraph is always kept.
/// Returns the cleaned text and the removed headings in document order.
pub fn strip_headings(text: &str) -> (String, Vec<HeadingInfo>) {
    let lines: Vec<&str> = text.split('\n').collect();
    let is_blank = |index: usize| lines.get(index).is_none_or(|line| line.trim().is_empty());

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut headings = Vec::new();
    // Offset at which the next retained line will start
    let mut cursor = 0usize;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let isolated = !trimmed.is_empty()
            && (index == 0 || is_blank(index - 1))
            && is_blank(index + 1);

        if isolated && is_heading_line(trimmed) {
            headings.push(HeadingInfo {
                text: trimmed.to_string(),
                char_index: cursor,
            });
            continue;
        }

        kept.push(line);
        cursor += line.len() + 1;
    }

    let cleaned = kept.join("\n");
    for heading in &mut headings {
        heading.char_index = heading.char_index.min(cleaned.len());
    }

    (cleaned, headings)
}
