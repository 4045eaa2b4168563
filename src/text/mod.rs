/*!
 * Text preparation for scene segmentation.
 *
 * - `headings`: removes isolated heading lines and remembers where they were
 * - `slicer`: offset-tracked sentence slicing with paragraph grouping
 * - `titles`: scene title synthesis from headings and classifier titles
 */

pub mod headings;
pub mod slicer;
pub mod titles;

// Re-export main types
pub use headings::{strip_headings, HeadingInfo};
pub use slicer::{build_sentence_slices, split_paragraphs, split_sentences, SentenceSlice};
pub use titles::{format_heading, synthesize_title, HeadingIndex, TitleSynthesizer};
