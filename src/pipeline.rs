//! End-to-end OCR pipeline: detect, extract, recognize.
//!
//! The [`Ocr`] orchestrator owns a detector, a recognizer, and a region
//! extractor. Per image it runs detection once, then fans the assembled
//! lines out over a thread pool for extraction and recognition. Results
//! come back in reading order regardless of which worker finished first.

use crate::core::config::PipelineConfig;
use crate::core::errors::OcrError;
use crate::core::executor::{DetectionExecutor, RecognitionExecutor};
use crate::models::detection::CtpnDetector;
use crate::models::recognition::CrnnRecognizer;
use crate::processors::decode::{Alphabet, CtcDecoder};
use crate::processors::types::TextLine;
use crate::utils::region::RegionExtractor;
use crate::utils::resize::limit_height;
use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One recognized text line, in source-image coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// The decoded text. Never empty; lines that decode to nothing are
    /// dropped before results are returned.
    pub text: String,
    /// Suggested anchor point for a downstream label, derived from the
    /// line's top-left corner plus the configured vertical offset.
    pub position: (i32, i32),
    /// The oriented line this text was read from.
    pub line: TextLine,
}

/// The full detection-plus-recognition pipeline.
pub struct Ocr<D, R> {
    detector: CtpnDetector<D>,
    recognizer: CrnnRecognizer<R>,
    extractor: RegionExtractor,
    max_height: Option<u32>,
    label_offset_y: i32,
}

impl<D, R> Ocr<D, R>
where
    D: DetectionExecutor,
    R: RecognitionExecutor,
{
    /// Builds a pipeline from its two executors and an alphabet, with
    /// everything else at the given configuration.
    pub fn new(
        detection_executor: D,
        recognition_executor: R,
        alphabet: Alphabet,
        config: PipelineConfig,
    ) -> Result<Self, OcrError> {
        config.validate()?;
        let detector = CtpnDetector::new(detection_executor, config.detection)?;
        let recognizer = CrnnRecognizer::new(
            recognition_executor,
            CtcDecoder::new(alphabet),
            &config.recognition,
        )?;
        let extractor = RegionExtractor::from_config(&config.recognition);
        Ok(Self {
            detector,
            recognizer,
            extractor,
            max_height: config.max_height,
            label_offset_y: config.label_offset_y,
        })
    }

    /// Runs OCR on one image.
    ///
    /// Returns recognized lines in reading order (top to bottom by corner-y
    /// sum), with line coordinates mapped back to the source image when it
    /// was downscaled for detection. An image with no text — including one
    /// too small to hold a single detection cell — yields an empty vector,
    /// not an error.
    pub fn run(&self, image: RgbImage) -> Result<Vec<OcrResult>, OcrError> {
        let started = std::time::Instant::now();
        let (working, scale) = match self.max_height {
            Some(max_height) => limit_height(image, max_height),
            None => (image, 1.0),
        };

        let mut lines = self.detector.detect(&working)?;
        lines.sort_by(|a, b| {
            a.y_sum()
                .partial_cmp(&b.y_sum())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(lines = lines.len(), scale, "detection finished");

        let recognized: Vec<Option<(TextLine, String)>> = lines
            .into_par_iter()
            .map(|line| -> Result<Option<(TextLine, String)>, OcrError> {
                let Some(crop) = self.extractor.extract(&working, &line) else {
                    return Ok(None);
                };
                let text = self.recognizer.recognize(&crop)?;
                Ok(Some((line, text)))
            })
            .collect::<Result<_, _>>()?;

        let results = recognized
            .into_iter()
            .flatten()
            .filter(|(_, text)| !text.is_empty())
            .map(|(mut line, text)| {
                line.scale(scale);
                let (x, y) = line.top_left();
                OcrResult {
                    text,
                    position: (x.round() as i32, y.round() as i32 + self.label_offset_y),
                    line,
                }
            })
            .collect::<Vec<_>>();
        debug!(
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(results)
    }
}
