/*!
 * Scene segmentation.
 *
 * - `types`: chunks, classifier proposals, reconciled and final scenes
 * - `chunker`: overlapping character-bounded chunks for the classifier
 * - `reconciler`: turns untrusted proposals into non-overlapping scenes
 * - `merger`: continuation merging and duplicate removal
 * - `rebalancer`: splits scenes into prompt-sized segments
 */

pub mod chunker;
pub mod merger;
pub mod rebalancer;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use chunker::{chunk_sentence_pairs, single_chunk, ChunkingOptions};
pub use merger::{merge_candidates, normalize_content};
pub use rebalancer::{rebalance, PromptSegment};
pub use reconciler::{ChunkReconciliation, ReconcileState, SceneReconciler};
pub use types::{
    FinalScene, ProposalRejection, RawSceneProposal, ReconciledScene, SceneCandidate, SceneSentence,
    SentenceChunk,
};
