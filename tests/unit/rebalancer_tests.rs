/*!
 * Tests for prompt segment rebalancing
 */

use novelscene::segmentation::{rebalance, PromptSegment};

fn scene_pairs(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| {
            (
                format!("La phrase {} raconte un épisode de la traversée du désert sous le soleil.", i),
                format!("Sentence {} tells an episode of the desert crossing under the sun.", i),
            )
        })
        .collect()
}

/// Test that an oversized scene is split under the cap without losing text
#[test]
fn test_rebalance_oversizedScene_shouldSplitAndPreserveSourceText() {
    let pairs = scene_pairs(40);
    let cap = 1000;

    let segments = rebalance(&pairs, cap);

    assert!(segments.len() >= 2);
    for segment in &segments {
        assert!(segment.char_count() <= cap);
        assert_eq!(segment.sentences.len(), segment.translations.len());
    }
    let rebuilt = segments.iter().map(PromptSegment::source_text).collect::<Vec<_>>().join(" ");
    let original = pairs.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(rebuilt, original);
}

/// Test that a small scene stays in one segment
#[test]
fn test_rebalance_smallScene_shouldStayWhole() {
    let pairs = scene_pairs(3);

    let segments = rebalance(&pairs, 4000);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].translated_text(), pairs.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>().join(" "));
}

/// Test that a translation too long for its sentence's allowance is shortened at a space
#[test]
fn test_rebalance_longTranslation_shouldBeTruncated() {
    let sentence = "s".repeat(900);
    let translation = vec!["word"; 100].join(" ");
    let pairs = vec![(sentence.clone(), translation)];

    let segments = rebalance(&pairs, 1000);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].sentences[0], sentence);
    let kept = &segments[0].translations[0];
    assert!(kept.chars().count() <= 100);
    assert!(kept.ends_with("word"));
    assert!(segments[0].char_count() <= 1000);
}

/// Test that a single sentence above the cap terminates at the floor
#[test]
fn test_rebalance_sentenceAboveCap_shouldTerminate() {
    let mut pairs = scene_pairs(5);
    pairs.insert(2, ("x".repeat(1500), "y".repeat(1500)));

    let segments = rebalance(&pairs, 1000);

    let total: usize = segments.iter().map(|segment| segment.sentences.len()).sum();
    assert_eq!(total, 6);
    let oversized: Vec<&PromptSegment> = segments.iter().filter(|s| s.char_count() > 1000).collect();
    assert_eq!(oversized.len(), 1);
    assert_eq!(oversized[0].sentences, vec!["x".repeat(1500)]);
}

#[test]
fn test_rebalance_emptyScene_shouldReturnNoSegment() {
    assert!(rebalance(&[], 1000).is_empty());
}
