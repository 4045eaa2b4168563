/*!
 * Sentence translation.
 *
 * - `batch`: budgeted batching and 1:1 realignment of translator output
 */

pub mod batch;

// Re-export main types
pub use batch::{plan_batches, TranslationBatcher};
