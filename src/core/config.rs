//! Configuration for the OCR pipeline.
//!
//! All tunable thresholds and policy constants live here, including the two
//! behaviors flagged as questionable in the design notes (the tall-region
//! filter and the label y-offset). They are fields, not magic numbers, so a
//! host can turn them off without patching the pipeline.

use crate::core::errors::OcrError;
use serde::{Deserialize, Serialize};

/// Grid stride of the CTPN detection network. The anchor layout, the
/// minimum proposal extent, and the default horizontal grouping gap are all
/// expressed in multiples of this.
pub const DETECTION_STRIDE: u32 = 16;

/// CTPN base anchor heights, one anchor per height per grid cell.
pub const BASE_ANCHOR_HEIGHTS: [f32; 10] =
    [11.0, 16.0, 23.0, 33.0, 48.0, 68.0, 97.0, 139.0, 198.0, 283.0];

/// Per-channel RGB mean subtracted from detection inputs.
pub const DETECTION_IMAGE_MEAN: [f32; 3] = [123.68, 116.779, 103.939];

/// Configuration for the detection stage (anchors through line assembly).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Grid stride of the detection network.
    pub stride: u32,
    /// Base anchor heights emitted per grid cell.
    pub base_heights: Vec<f32>,
    /// Per-channel RGB mean subtracted before inference.
    pub image_mean: [f32; 3],
    /// Minimum text-class probability for a proposal to survive filtering.
    pub prob_threshold: f32,
    /// IoU threshold for greedy non-maximum suppression.
    pub nms_threshold: f32,
    /// Maximum horizontal pixel gap between grouped proposals.
    pub max_horizontal_gap: u32,
    /// Minimum vertical overlap ratio (relative to the smaller box) for two
    /// proposals to be considered part of the same line.
    pub min_vertical_overlap: f32,
    /// Minimum height similarity ratio for two proposals to be grouped.
    pub min_size_similarity: f32,
    /// Horizontal margin added to each assembled line, in pixels. Deliberate
    /// over-inclusion so character edges are not clipped before recognition.
    pub expand_margin: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            stride: DETECTION_STRIDE,
            base_heights: BASE_ANCHOR_HEIGHTS.to_vec(),
            image_mean: DETECTION_IMAGE_MEAN,
            prob_threshold: 0.5,
            nms_threshold: 0.3,
            max_horizontal_gap: DETECTION_STRIDE,
            min_vertical_overlap: 0.6,
            min_size_similarity: 0.6,
            expand_margin: 10.0,
        }
    }
}

impl DetectionConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.stride == 0 {
            return Err(OcrError::invalid_field("stride", "a positive value", self.stride));
        }
        if self.base_heights.is_empty() {
            return Err(OcrError::config("base_heights must not be empty"));
        }
        if let Some(&h) = self.base_heights.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(OcrError::invalid_field("base_heights", "positive finite heights", h));
        }
        for (name, value) in [
            ("prob_threshold", self.prob_threshold),
            ("nms_threshold", self.nms_threshold),
            ("min_vertical_overlap", self.min_vertical_overlap),
            ("min_size_similarity", self.min_size_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(OcrError::invalid_field(name, "a value in [0, 1]", value));
            }
        }
        if self.max_horizontal_gap == 0 {
            return Err(OcrError::invalid_field(
                "max_horizontal_gap",
                "a positive value",
                self.max_horizontal_gap,
            ));
        }
        if !self.expand_margin.is_finite() || self.expand_margin < 0.0 {
            return Err(OcrError::invalid_field(
                "expand_margin",
                "a non-negative value",
                self.expand_margin,
            ));
        }
        Ok(())
    }
}

/// Configuration for region extraction and the recognition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Input height of the recognition network. Crops are resized to this
    /// height with their aspect ratio preserved.
    pub input_height: u32,
    /// Reject crops whose height exceeds their width. Wrong for vertical
    /// scripts; turn off when those are expected.
    pub reject_tall_regions: bool,
    /// Pad each quad by 10% of its width and 20% of its height before
    /// extraction.
    pub adjust_regions: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            input_height: 32,
            reject_tall_regions: true,
            adjust_regions: false,
        }
    }
}

impl RecognitionConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.input_height == 0 {
            return Err(OcrError::invalid_field(
                "input_height",
                "a positive value",
                self.input_height,
            ));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detection stage configuration.
    pub detection: DetectionConfig,
    /// Recognition stage configuration.
    pub recognition: RecognitionConfig,
    /// Images taller than this are downscaled before detection; results are
    /// mapped back to original coordinates. `None` disables downscaling.
    pub max_height: Option<u32>,
    /// Vertical offset added to reported positions, in original-image pixels.
    /// Places a downstream label below the detected text instead of on top
    /// of it.
    pub label_offset_y: i32,
}

impl PipelineConfig {
    /// Creates the configuration for screen-overlay use: downscale above
    /// 1440 px, +20 px label offset so labels land below the text.
    pub fn overlay_defaults() -> Self {
        Self {
            max_height: Some(1440),
            label_offset_y: 20,
            ..Self::default()
        }
    }

    /// Validates the configuration and everything nested in it.
    pub fn validate(&self) -> Result<(), OcrError> {
        self.detection.validate()?;
        self.recognition.validate()?;
        if let Some(max_height) = self.max_height {
            if max_height < self.detection.stride {
                return Err(OcrError::invalid_field(
                    "max_height",
                    "at least one detection stride",
                    max_height,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PipelineConfig::default().validate().unwrap();
        PipelineConfig::overlay_defaults().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = DetectionConfig {
            prob_threshold: 1.5,
            ..DetectionConfig::default()
        };
        assert!(matches!(config.validate(), Err(OcrError::Config { .. })));
    }

    #[test]
    fn rejects_empty_anchor_heights() {
        let config = DetectionConfig {
            base_heights: Vec::new(),
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_recognition_height() {
        let config = RecognitionConfig {
            input_height: 0,
            ..RecognitionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
