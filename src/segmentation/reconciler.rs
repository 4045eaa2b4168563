/*!
 * Scene boundary reconciliation.
 *
 * Classifier proposals are untrusted. Each one is validated, mapped from
 * chunk-local to global sentence indices, widened to whole paragraphs and
 * clipped against the high-water mark so accepted scenes never overlap.
 *
 * The running state (high-water mark, last summary, accepted candidates) is an
 * explicit value threaded through `reconcile_chunk`, one chunk at a time.
 */

use log::debug;

use super::types::{ProposalRejection, RawSceneProposal, ReconciledScene, SceneCandidate, SentenceChunk};
use crate::text::SentenceSlice;

/// Accumulator carried from one chunk to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileState {
    /// Highest global sentence index claimed by an accepted scene
    pub high_water_mark: Option<usize>,
    /// Summary of the most recently accepted scene that had one
    pub previous_summary: Option<String>,
    /// Accepted candidates in document order
    pub candidates: Vec<SceneCandidate>,
}

impl ReconcileState {
    /// First global sentence index not yet claimed
    pub fn next_free_sentence(&self) -> usize {
        self.high_water_mark.map_or(0, |mark| mark + 1)
    }
}

/// Outcome of reconciling one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReconciliation {
    pub state: ReconcileState,
    /// Discarded proposals, in the order they were returned
    pub rejections: Vec<ProposalRejection>,
}

/// Global index of the first sentence of the paragraph containing `index`
pub fn paragraph_start(slices: &[SentenceSlice], index: usize) -> usize {
    let paragraph = slices[index].paragraph_index;
    let mut start = index;
    while start > 0 && slices[start - 1].paragraph_index == paragraph {
        start -= 1;
    }
    start
}

/// Global index of the last sentence of the paragraph containing `index`
pub fn paragraph_end(slices: &[SentenceSlice], index: usize) -> usize {
    let paragraph = slices[index].paragraph_index;
    let mut end = index;
    while end + 1 < slices.len() && slices[end + 1].paragraph_index == paragraph {
        end += 1;
    }
    end
}

/// Trimmed cleaned-text substring spanning sentences `start..=end`
pub fn scene_content(source: &str, slices: &[SentenceSlice], start: usize, end: usize) -> String {
    source[slices[start].start..slices[end].end].trim().to_string()
}

/// Reconciles classifier proposals against one document's sentences
#[derive(Debug, Clone, Copy)]
pub struct SceneReconciler<'a> {
    source: &'a str,
    slices: &'a [SentenceSlice],
}

impl<'a> SceneReconciler<'a> {
    /// Create a reconciler over the cleaned text and its sentence slices
    pub fn new(source: &'a str, slices: &'a [SentenceSlice]) -> Self {
        Self { source, slices }
    }

    /// Apply the proposals returned for `chunk` on top of `state`
    pub fn reconcile_chunk(
        &self,
        state: ReconcileState,
        chunk: &SentenceChunk,
        proposals: &[RawSceneProposal],
    ) -> ChunkReconciliation {
        let mut state = state;
        let mut rejections = Vec::new();

        for proposal in proposals {
            match self.accept(&state, chunk, proposal) {
                Ok(scene) => {
                    state.high_water_mark = Some(
                        state
                            .high_water_mark
                            .map_or(scene.sentence_end, |mark| mark.max(scene.sentence_end)),
                    );
                    if let Some(summary) = proposal.summary_text() {
                        state.previous_summary = Some(summary.to_string());
                    }
                    state.candidates.push(SceneCandidate {
                        scene,
                        continues_from_previous: proposal.continues_from_previous,
                        continues_to_next: proposal.continues_to_next,
                    });
                }
                Err(rejection) => {
                    debug!("Chunk {}: discarded scene proposal: {}", chunk.index, rejection);
                    rejections.push(rejection);
                }
            }
        }

        ChunkReconciliation { state, rejections }
    }

    fn accept(
        &self,
        state: &ReconcileState,
        chunk: &SentenceChunk,
        proposal: &RawSceneProposal,
    ) -> Result<ReconciledScene, ProposalRejection> {
        let (local_start, local_end) = proposal.validate(chunk.len())?;

        let global_start = chunk.sentence_start + local_start;
        let global_end = chunk.sentence_start + local_end;
        if global_end >= self.slices.len() {
            return Err(ProposalRejection::OutsideDocument {
                global_end,
                sentence_count: self.slices.len(),
            });
        }

        let snapped_start = paragraph_start(self.slices, global_start);
        let end = paragraph_end(self.slices, global_end);
        let start = snapped_start.max(state.next_free_sentence());
        if start > end {
            return Err(ProposalRejection::AlreadyClaimed {
                start: snapped_start,
                end,
                high_water_mark: state.high_water_mark.unwrap_or_default(),
            });
        }

        let content = scene_content(self.source, self.slices, start, end);
        if content.is_empty() {
            return Err(ProposalRejection::EmptyContent { start, end });
        }

        Ok(ReconciledScene {
            title: proposal.title.clone(),
            summary: proposal.summary_text().map(str::to_string),
            content,
            sentence_start: start,
            sentence_end: end,
        })
    }
}
