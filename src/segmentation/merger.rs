/*!
 * Scene deduplication and continuation merging.
 */

use std::collections::HashSet;

use log::debug;

use super::reconciler::scene_content;
use super::types::{ReconciledScene, SceneCandidate};
use crate::text::SentenceSlice;

/// Collapse whitespace runs to single spaces
pub fn normalize_content(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_summaries(previous: Option<String>, next: Option<&str>) -> Option<String> {
    let next = next.map(str::trim).filter(|summary| !summary.is_empty());
    match (previous, next) {
        (Some(previous), Some(next)) if !previous.trim().is_empty() => {
            Some(format!("{} {}", previous.trim(), next))
        }
        (_, Some(next)) => Some(next.to_string()),
        (previous, None) => previous,
    }
}

/// Merge reconciled candidates into the final ordered scene list.
///
/// A candidate flagged `continues_from_previous` is folded into the last
/// accepted scene. Any other candidate whose normalized content was already
/// accepted is dropped as a duplicate.
pub fn merge_candidates(
    candidates: Vec<SceneCandidate>,
    source: &str,
    slices: &[SentenceSlice],
) -> Vec<ReconciledScene> {
    let mut merged: Vec<ReconciledScene> = Vec::with_capacity(candidates.len());
    // Normalized content of each merged scene, kept aligned with `merged`
    let mut normalized: Vec<String> = Vec::with_capacity(candidates.len());
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let scene = candidate.scene;

        if candidate.continues_from_previous {
            if let (Some(last), Some(last_normalized)) = (merged.last_mut(), normalized.last_mut()) {
                let start = last.sentence_start.min(scene.sentence_start);
                let end = last.sentence_end.max(scene.sentence_end);
                last.content = scene_content(source, slices, start, end);
                last.sentence_start = start;
                last.sentence_end = end;
                last.summary = join_summaries(last.summary.take(), scene.summary.as_deref());

                seen.remove(last_normalized.as_str());
                *last_normalized = normalize_content(&last.content);
                seen.insert(last_normalized.clone());
                continue;
            }
        }

        let key = normalize_content(&scene.content);
        if seen.contains(&key) {
            debug!(
                "Dropped duplicate scene covering sentences {}..={}",
                scene.sentence_start, scene.sentence_end
            );
            continue;
        }

        seen.insert(key.clone());
        normalized.push(key);
        merged.push(scene);
    }

    merged
}
