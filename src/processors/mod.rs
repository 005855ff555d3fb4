//! Deterministic post-processing algorithms for detection and recognition.
//!
//! Everything here is a pure function (or a cheap struct of cached
//! thresholds) over flat numeric data: anchor generation, box regression,
//! proposal filtering, non-maximum suppression, text-line assembly, and CTC
//! decoding.

pub mod anchors;
pub mod decode;
pub mod line_assembly;
pub mod nms;
pub mod types;

pub use anchors::{apply_regression, clip_boxes, filter_by_score, filter_by_size, AnchorGrid};
pub use decode::{Alphabet, CtcDecoder, BLANK_INDEX};
pub use line_assembly::LineAssembler;
pub use nms::suppress;
pub use types::{AnchorBox, TextLine};
