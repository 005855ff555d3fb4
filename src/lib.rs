//! Detection and recognition post-processing for a CTPN + CRNN OCR system.
//!
//! This crate is the deterministic half of an OCR pipeline: everything
//! before and after the two neural networks. It turns raw detection tensors
//! into oriented text lines (anchors, vertical regression, filtering, NMS,
//! line assembly), cuts skew-corrected line crops out of the source image,
//! and collapses raw recognition tensors into strings (greedy CTC).
//!
//! The networks themselves sit behind [`DetectionExecutor`] and
//! [`RecognitionExecutor`]; the host binds those to whatever inference
//! backend it runs. Everything in this crate is pure computation over the
//! tensors the executors exchange, so the whole pipeline can be exercised
//! with recorded fixtures.
//!
//! ```
//! use ctpn_ocr::{Alphabet, PipelineConfig};
//!
//! # fn main() -> Result<(), ctpn_ocr::OcrError> {
//! let alphabet = Alphabet::new("abc".chars())?;
//! let config = PipelineConfig::overlay_defaults();
//! config.validate()?;
//! // Ocr::new(detection_executor, recognition_executor, alphabet, config)
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

pub use crate::core::config::{
    DetectionConfig, PipelineConfig, RecognitionConfig, BASE_ANCHOR_HEIGHTS,
    DETECTION_IMAGE_MEAN, DETECTION_STRIDE,
};
pub use crate::core::errors::{OcrError, ProcessingStage};
pub use crate::core::executor::{DetectionExecutor, DetectionRawOutput, RecognitionExecutor};
pub use crate::core::tensor::{Tensor2D, Tensor3D, Tensor4D};
pub use models::{CrnnRecognizer, CtpnDetector};
pub use pipeline::{Ocr, OcrResult};
pub use processors::{Alphabet, AnchorBox, CtcDecoder, TextLine};
