//! CTPN-style text line detector.
//!
//! Wraps a [`DetectionExecutor`] with the full post-processing chain:
//! tensor preparation, anchor generation, vertical regression, clipping,
//! score and size filtering, non-maximum suppression, and oriented line
//! assembly. Coordinates in and out are pixels of the image handed to
//! [`CtpnDetector::detect`].

use crate::core::config::DetectionConfig;
use crate::core::errors::OcrError;
use crate::core::executor::{DetectionExecutor, DetectionRawOutput};
use crate::core::tensor::{rgb_to_detection_tensor, softmax};
use crate::processors::anchors::{
    apply_regression, clip_boxes, filter_by_score, filter_by_size, AnchorGrid,
};
use crate::processors::line_assembly::LineAssembler;
use crate::processors::nms::suppress;
use crate::processors::types::{AnchorBox, TextLine};
use image::RgbImage;
use ndarray::Axis;
use tracing::debug;

/// Model name used in error reports.
const MODEL_NAME: &str = "ctpn";

/// Text line detector over a CTPN-shaped network.
#[derive(Debug)]
pub struct CtpnDetector<E> {
    executor: E,
    config: DetectionConfig,
    grid: AnchorGrid,
    assembler: LineAssembler,
}

impl<E: DetectionExecutor> CtpnDetector<E> {
    /// Creates a detector over `executor`, validating `config` up front.
    pub fn new(executor: E, config: DetectionConfig) -> Result<Self, OcrError> {
        config.validate()?;
        let grid = AnchorGrid::new(config.stride, config.base_heights.clone());
        let assembler = LineAssembler::from_config(&config);
        Ok(Self {
            executor,
            config,
            grid,
            assembler,
        })
    }

    /// The detection configuration this detector was built with.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detects oriented text lines in `image`.
    ///
    /// Images smaller than one stride in either dimension have no grid
    /// cells; they produce an empty result without invoking the executor.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<TextLine>, OcrError> {
        let (width, height) = image.dimensions();
        if width < self.config.stride || height < self.config.stride {
            debug!(width, height, "image smaller than one stride, no anchors");
            return Ok(Vec::new());
        }

        let input = rgb_to_detection_tensor(image, self.config.image_mean);
        let raw = self.executor.run(input)?;
        let (scores, deltas) = self.unpack_raw_output(&raw, height, width)?;

        let anchors = self.grid.generate(height, width);
        let mut boxes = apply_regression(&anchors, &deltas, self.config.stride);
        clip_boxes(&mut boxes, height, width);

        let kept = filter_by_score(&scores, self.config.prob_threshold);
        let mut boxes: Vec<AnchorBox> = kept.iter().map(|&i| boxes[i]).collect();
        let mut scores: Vec<f32> = kept.iter().map(|&i| scores[i]).collect();
        let confident = boxes.len();

        let kept = filter_by_size(&boxes, self.config.stride as f32);
        boxes = kept.iter().map(|&i| boxes[i]).collect();
        scores = kept.iter().map(|&i| scores[i]).collect();

        let kept = suppress(&boxes, &scores, self.config.nms_threshold);
        let boxes: Vec<AnchorBox> = kept.iter().map(|&i| boxes[i]).collect();
        let scores: Vec<f32> = kept.iter().map(|&i| scores[i]).collect();

        let lines = self.assembler.assemble(&boxes, &scores, height, width);
        debug!(
            anchors = anchors.len(),
            confident,
            proposals = boxes.len(),
            lines = lines.len(),
            "detection post-processing complete"
        );
        Ok(lines)
    }

    /// Validates the executor's tensor shapes against the anchor contract
    /// and flattens them into per-anchor text scores and regression deltas.
    fn unpack_raw_output(
        &self,
        raw: &DetectionRawOutput,
        height: u32,
        width: u32,
    ) -> Result<(Vec<f32>, Vec<(f32, f32)>), OcrError> {
        let expected = self.grid.anchor_count(height, width);
        let logits_shape = raw.class_logits.shape();
        let reg_shape = raw.regressions.shape();
        if logits_shape != [1, expected, 2] {
            return Err(OcrError::malformed_output(
                MODEL_NAME,
                format!(
                    "class logits shape {:?} does not match expected (1, {}, 2)",
                    logits_shape, expected
                ),
            ));
        }
        if reg_shape != [1, expected, 2] {
            return Err(OcrError::malformed_output(
                MODEL_NAME,
                format!(
                    "regression shape {:?} does not match expected (1, {}, 2)",
                    reg_shape, expected
                ),
            ));
        }

        let logits = raw.class_logits.index_axis(Axis(0), 0);
        let regressions = raw.regressions.index_axis(Axis(0), 0);
        let mut scores = Vec::with_capacity(expected);
        let mut deltas = Vec::with_capacity(expected);
        for i in 0..expected {
            scores.push(softmax(logits.row(i))[1]);
            deltas.push((regressions[[i, 0]], regressions[[i, 1]]));
        }
        Ok((scores, deltas))
    }
}
