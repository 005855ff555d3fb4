//! The inference boundary.
//!
//! The geometry and decoding core never touches an inference backend
//! directly. Both networks sit behind synchronous tensor-in/tensor-out
//! traits so the pipeline can be exercised with recorded tensors in tests
//! and bound to any backend (ONNX Runtime, candle, a remote service) by the
//! host. Executors must be deterministic for identical weights and input.

use crate::core::errors::OcrError;
use crate::core::tensor::{Tensor3D, Tensor4D};

/// Raw tensors produced by the detection network for one image.
#[derive(Debug, Clone)]
pub struct DetectionRawOutput {
    /// Per-anchor two-class logits, shape (1, anchors, 2). Class 1 is text.
    /// Softmax is applied by the pipeline, not the executor.
    pub class_logits: Tensor3D,
    /// Per-anchor vertical regression deltas, shape (1, anchors, 2):
    /// center offset in anchor-height units and log-space height scale.
    pub regressions: Tensor3D,
}

/// Executor for the text detection network.
///
/// Input is a mean-subtracted, channel-first float tensor of shape
/// (1, 3, height, width). The anchor count in the output must equal
/// `⌊h/stride⌋ · ⌊w/stride⌋ · |base_heights|` for the input dimensions; the
/// pipeline verifies this and reports a mismatch as an inference failure.
pub trait DetectionExecutor: Send + Sync {
    /// Runs the detection network on one image tensor.
    fn run(&self, input: Tensor4D) -> Result<DetectionRawOutput, OcrError>;
}

/// Executor for the text recognition network.
///
/// Input is a single-channel tensor of shape (1, 1, height, width) with
/// values in [-1, 1]; the width varies per crop. Output is a per-timestep
/// class-score tensor of shape (timesteps, 1, classes) where class 0 is the
/// CTC blank.
pub trait RecognitionExecutor: Send + Sync {
    /// Runs the recognition network on one normalized crop tensor.
    fn run(&self, input: Tensor4D) -> Result<Tensor3D, OcrError>;
}

impl<T: DetectionExecutor + ?Sized> DetectionExecutor for std::sync::Arc<T> {
    fn run(&self, input: Tensor4D) -> Result<DetectionRawOutput, OcrError> {
        (**self).run(input)
    }
}

impl<T: RecognitionExecutor + ?Sized> RecognitionExecutor for std::sync::Arc<T> {
    fn run(&self, input: Tensor4D) -> Result<Tensor3D, OcrError> {
        (**self).run(input)
    }
}
