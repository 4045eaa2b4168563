/*!
 * Tests for heading stripping, sentence slicing and title synthesis
 */

use novelscene::text::{
    build_sentence_slices, format_heading, split_paragraphs, split_sentences, strip_headings,
    synthesize_title, TitleSynthesizer,
};

use crate::common::SHORT_NOVEL;

/// Test that every slice maps back to the exact cleaned text
#[test]
fn test_buildSentenceSlices_shouldKeepExactProvenance() {
    let text = "  Il pleuvait.   Le vent soufflait fort !\n\n\tPersonne ne sortait ? Non.\n   \nLa nuit tomba.";
    let slices = build_sentence_slices(text, 1000);

    assert_eq!(slices.len(), 5);
    let mut previous_start = 0;
    for slice in &slices {
        assert_eq!(slice.text, text[slice.start..slice.end].trim());
        assert!(slice.start >= previous_start);
        previous_start = slice.start;
    }
    let paragraphs: Vec<usize> = slices.iter().map(|s| s.paragraph_index).collect();
    assert_eq!(paragraphs, vec![0, 0, 1, 1, 2]);
}

/// Test that oversized sentences are cut under the unit budget
#[test]
fn test_buildSentenceSlices_longSentence_shouldSplitAtSpaces() {
    let sentence = format!("{}.", vec!["mot"; 700].join(" "));
    let text = format!("Court.\n\n{}", sentence);

    let slices = build_sentence_slices(&text, 1000);

    assert!(slices.len() >= 4);
    assert_eq!(slices[0].text, "Court.");
    for pair in slices[1..].windows(2) {
        assert!(text[pair[0].end..pair[1].start].trim().is_empty());
    }
    for slice in &slices[1..] {
        assert!(slice.text.chars().count() <= 1000);
        assert!(slice.text.chars().count() >= 300);
        assert_eq!(slice.paragraph_index, 1);
        assert!(!slice.text.starts_with(' '));
    }
}

/// Test that multi-byte text keeps valid offsets when split
#[test]
fn test_buildSentenceSlices_accentedText_shouldSplitOnCharBoundaries() {
    let text = "é".repeat(2500);

    let slices = build_sentence_slices(&text, 1000);

    assert_eq!(slices.len(), 3);
    assert_eq!(slices[0].text.chars().count(), 1000);
    assert_eq!(slices.iter().map(|s| s.text.as_str()).collect::<String>(), text);
}

/// Test that text without punctuation becomes a single slice
#[test]
fn test_buildSentenceSlices_withoutPunctuation_shouldReturnWholeText() {
    let text = "\n  un texte sans aucune ponctuation finale  \n";

    let slices = build_sentence_slices(text, 1000);

    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].text, "un texte sans aucune ponctuation finale");
    assert!(build_sentence_slices(" \n\t ", 1000).is_empty());
}

#[test]
fn test_splitHelpers_shouldIgnoreBlankPieces() {
    assert_eq!(split_sentences("Oui ! Non ? Peut-être."), vec!["Oui !", "Non ?", "Peut-être."]);
    assert_eq!(split_paragraphs("Un.\n \nDeux.\n\n\n\nTrois."), vec!["Un.", "Deux.", "Trois."]);
}

/// Test heading detection on a small novel
#[test]
fn test_stripHeadings_shortNovel_shouldRemoveChapterAndPart() {
    let (cleaned, headings) = strip_headings(SHORT_NOVEL);

    let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["CHAPTER I", "PART II"]);
    assert!(cleaned[headings[1].char_index..].trim_start().starts_with("Le marché"));
    assert!(cleaned.contains("Le boulanger ouvrait sa boutique."));
}

#[test]
fn test_stripHeadings_shouldRecognizeHeadingForms() {
    let text = "Chapitre 3 : Le retour\n\nTexte.\n\nIV.\n\nSuite.\n\n42\n\nFin.";
    let (cleaned, headings) = strip_headings(text);

    assert_eq!(headings.len(), 3);
    assert_eq!(headings[0].text, "Chapitre 3 : Le retour");
    assert_eq!(split_paragraphs(&cleaned), vec!["Texte.", "Suite.", "Fin."]);
}

/// Test that long uppercase lines and mixed-case lines stay in the text
#[test]
fn test_stripHeadings_longUppercaseLine_shouldBeKept() {
    let shout = "IL CRIA TRÈS FORT ".repeat(6);
    let text = format!("Début.\n\n{}\n\nUne phrase normale\n\nFin.", shout.trim());

    let (cleaned, headings) = strip_headings(&text);

    assert!(headings.is_empty());
    assert_eq!(cleaned, text);
}

#[test]
fn test_formatHeading_shouldPreserveShortUppercaseWords() {
    assert_eq!(format_heading("  BOOK   III  "), "Book III");
    assert_eq!(format_heading("THE RETURN OF THE KING"), "THE Return OF THE King");
    assert_eq!(format_heading("Chapitre premier"), "Chapitre premier");
}

/// Test title precedence
#[test]
fn test_synthesizeTitle_shouldFollowPrecedence() {
    assert_eq!(synthesize_title(Some("Un marché"), Some("PART II"), "x", 2), "Part II: Un marché");
    assert_eq!(synthesize_title(Some("Scene 4"), Some("CHAPTER I"), "x", 4), "Chapter I");
    assert_eq!(
        synthesize_title(Some("Chapter I: Arrival"), Some("CHAPTER I"), "x", 1),
        "Chapter I: Arrival"
    );
    assert_eq!(synthesize_title(Some(" Le départ "), None, "x", 1), "Le départ");
    assert_eq!(
        synthesize_title(None, None, "il était une fois un petit village au bord de la mer.", 3),
        "Il était une fois un petit village au"
    );
    assert_eq!(synthesize_title(Some("  "), None, "...", 5), "Scene 5");
}

/// Test that scenes inherit the last heading at or before their start
#[test]
fn test_titleSynthesizer_shouldInheritHeadingsAcrossScenes() {
    let (cleaned, headings) = strip_headings(SHORT_NOVEL);
    let slices = build_sentence_slices(&cleaned, 1000);
    let titles = TitleSynthesizer::new(&headings, &slices);

    assert_eq!(slices.len(), 6);
    assert_eq!(titles.title_for(None, 0, &slices[0].text, 1), "Chapter I");
    assert_eq!(titles.title_for(Some("Le pain"), 2, &slices[2].text, 2), "Chapter I: Le pain");
    assert_eq!(titles.title_for(Some("Scene 3"), 4, &slices[4].text, 3), "Part II");
}
