/*!
 * Property tests for the segmentation stages over generated documents
 */

use novelscene::segmentation::{
    chunk_sentence_pairs, merge_candidates, rebalance, ChunkingOptions, RawSceneProposal, ReconcileState,
    SceneReconciler,
};
use novelscene::text::{build_sentence_slices, SentenceSlice};
use proptest::prelude::*;

/// Words, sentence ends, spaces and paragraph breaks
fn raw_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-zéèçA-Z]{1,14}",
            2 => Just(" ".to_string()),
            1 => Just(". ".to_string()),
            1 => Just("! ".to_string()),
            1 => Just("\n\n".to_string()),
            1 => Just("\n".to_string()),
        ],
        0..160,
    )
    .prop_map(|pieces| pieces.concat())
}

/// A document of 1 to 12 paragraphs holding 1 to 4 sentences each
fn novel() -> impl Strategy<Value = String> {
    prop::collection::vec(1usize..=4, 1..=12).prop_map(|paragraphs| {
        paragraphs
            .iter()
            .enumerate()
            .map(|(p, &count)| {
                (1..=count)
                    .map(|s| format!("Paragraphe {}, phrase {}.", p + 1, s))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    })
}

fn proposal() -> impl Strategy<Value = RawSceneProposal> {
    (-1i64..14, -1i64..14, any::<bool>(), any::<bool>()).prop_map(|(start, end, from_previous, to_next)| {
        let mut proposal = RawSceneProposal::new(start, end).with_summary(&format!("{}-{}", start, end));
        if from_previous {
            proposal = proposal.continuing_from_previous();
        }
        if to_next {
            proposal = proposal.continuing_to_next();
        }
        proposal
    })
}

fn is_paragraph_start(slices: &[SentenceSlice], index: usize) -> bool {
    index == 0 || slices[index - 1].paragraph_index != slices[index].paragraph_index
}

fn is_paragraph_end(slices: &[SentenceSlice], index: usize) -> bool {
    index + 1 == slices.len() || slices[index + 1].paragraph_index != slices[index].paragraph_index
}

proptest! {
    #[test]
    fn prop_buildSentenceSlices_shouldKeepExactOrderedBoundedSlices(text in raw_text(), max_chars in 20usize..200) {
        let slices = build_sentence_slices(&text, max_chars);

        let mut previous_end = 0;
        let mut previous_paragraph = 0;
        for slice in &slices {
            prop_assert_eq!(&slice.text, &text[slice.start..slice.end]);
            prop_assert!(!slice.text.trim().is_empty());
            prop_assert!(slice.start >= previous_end);
            prop_assert!(slice.paragraph_index >= previous_paragraph);
            prop_assert!(slice.text.chars().count() <= max_chars);
            previous_end = slice.end;
            previous_paragraph = slice.paragraph_index;
        }
        prop_assert_eq!(slices.is_empty(), text.trim().is_empty());
    }

    #[test]
    fn prop_chunkSentencePairs_shouldCoverInOrderUnderCap(
        lengths in prop::collection::vec(1usize..400, 1..120),
        cap in 50usize..2500,
        overlap_ratio in 0.0f64..0.9,
    ) {
        let source: Vec<String> = lengths.iter().map(|&length| "x".repeat(length)).collect();
        let options = ChunkingOptions { max_tokens: 128, overlap_ratio, max_chunk_chars: Some(cap) };

        let chunks = chunk_sentence_pairs(&source, &[], &options);

        prop_assert_eq!(chunks[0].sentence_start, 0);
        prop_assert_eq!(chunks.last().map(|chunk| chunk.sentence_end), Some(source.len()));
        for chunk in &chunks {
            prop_assert!(!chunk.source_sentences.is_empty());
            prop_assert!(chunk.char_count <= cap || chunk.len() == 1);
        }
        for pair in chunks.windows(2) {
            prop_assert!(pair[1].sentence_start > pair[0].sentence_start);
            prop_assert!(pair[1].sentence_start <= pair[0].sentence_end);
        }
    }

    #[test]
    fn prop_reconcileAndMerge_shouldYieldDisjointParagraphAlignedScenes(
        text in novel(),
        cap in 60usize..400,
        overlap_ratio in 0.0f64..0.5,
        responses in prop::collection::vec(prop::collection::vec(proposal(), 0..6), 1..8),
    ) {
        let slices = build_sentence_slices(&text, 1000);
        let sentences: Vec<String> = slices.iter().map(|slice| slice.text.clone()).collect();
        let options = ChunkingOptions { max_tokens: 128, overlap_ratio, max_chunk_chars: Some(cap) };
        let chunks = chunk_sentence_pairs(&sentences, &[], &options);
        let reconciler = SceneReconciler::new(&text, &slices);

        let mut state = ReconcileState::default();
        for chunk in &chunks {
            let proposals = &responses[chunk.index % responses.len()];
            state = reconciler.reconcile_chunk(state, chunk, proposals).state;
        }
        let scenes = merge_candidates(state.candidates, &text, &slices);

        for scene in &scenes {
            prop_assert!(scene.sentence_start <= scene.sentence_end);
            prop_assert!(scene.sentence_end < slices.len());
            prop_assert!(is_paragraph_start(&slices, scene.sentence_start));
            prop_assert!(is_paragraph_end(&slices, scene.sentence_end));
            let expected = text[slices[scene.sentence_start].start..slices[scene.sentence_end].end].trim();
            prop_assert_eq!(scene.content.as_str(), expected);
        }
        for pair in scenes.windows(2) {
            prop_assert!(pair[1].sentence_start > pair[0].sentence_end);
        }
    }

    #[test]
    fn prop_rebalance_shouldFitCapAndKeepEverySentence(
        pairs in prop::collection::vec(("[a-z ]{1,300}", "[a-z ]{0,400}"), 0..40),
        cap in 100usize..3000,
    ) {
        let segments = rebalance(&pairs, cap);

        let mut kept = Vec::new();
        for segment in &segments {
            prop_assert!(!segment.is_empty());
            prop_assert_eq!(segment.sentences.len(), segment.translations.len());
            prop_assert!(segment.char_count() <= cap || segment.sentences.len() == 1);
            kept.extend(segment.sentences.iter().cloned().zip(segment.translations.iter().cloned()));
        }
        prop_assert_eq!(kept.len(), pairs.len());
        for ((sentence, translation), (original_sentence, original_translation)) in kept.iter().zip(&pairs) {
            prop_assert_eq!(sentence, original_sentence);
            prop_assert!(original_translation.starts_with(translation.as_str()));
        }
    }
}
