//! CRNN-style text line recognizer.
//!
//! Wraps a [`RecognitionExecutor`] with preprocessing (grayscale,
//! height-normalized resize, [-1, 1] scaling) and CTC greedy decoding.

use crate::core::config::RecognitionConfig;
use crate::core::errors::OcrError;
use crate::core::executor::RecognitionExecutor;
use crate::core::tensor::{argmax, gray_to_recognition_tensor};
use crate::processors::decode::CtcDecoder;
use crate::utils::resize::resize_to_height;
use image::{imageops, RgbImage};
use tracing::debug;

/// Model name used in error reports.
const MODEL_NAME: &str = "crnn";

/// Text recognizer over a CRNN-shaped network.
#[derive(Debug)]
pub struct CrnnRecognizer<E> {
    executor: E,
    decoder: CtcDecoder,
    input_height: u32,
}

impl<E: RecognitionExecutor> CrnnRecognizer<E> {
    /// Creates a recognizer over `executor`, validating `config` up front.
    pub fn new(executor: E, decoder: CtcDecoder, config: &RecognitionConfig) -> Result<Self, OcrError> {
        config.validate()?;
        Ok(Self {
            executor,
            decoder,
            input_height: config.input_height,
        })
    }

    /// The decoder (and thereby alphabet) this recognizer was built with.
    pub fn decoder(&self) -> &CtcDecoder {
        &self.decoder
    }

    /// Recognizes the text in one line crop.
    ///
    /// An empty string means the network saw no text; callers drop those
    /// lines rather than treating them as failures.
    pub fn recognize(&self, crop: &RgbImage) -> Result<String, OcrError> {
        let gray = imageops::grayscale(crop);
        let resized = resize_to_height(&gray, self.input_height, None)?;
        let input = gray_to_recognition_tensor(&resized);

        let output = self.executor.run(input)?;
        let shape = output.shape();
        let classes = self.decoder.alphabet().class_count();
        if shape.len() != 3 || shape[1] != 1 || shape[2] != classes {
            return Err(OcrError::malformed_output(
                MODEL_NAME,
                format!(
                    "output shape {:?} does not match expected (timesteps, 1, {})",
                    shape, classes
                ),
            ));
        }

        let timesteps = shape[0];
        let mut indices = Vec::with_capacity(timesteps);
        for t in 0..timesteps {
            indices.push(argmax(output.slice(ndarray::s![t, 0, ..])));
        }
        let text = self.decoder.decode(&indices)?;
        debug!(timesteps, text = %text, "recognition complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tensor::{Tensor3D, Tensor4D};
    use crate::processors::decode::Alphabet;

    /// Replays fixed per-timestep logits regardless of input, asserting the
    /// input tensor honors the preprocessing contract.
    struct ReplayExecutor {
        indices: Vec<usize>,
        classes: usize,
    }

    impl RecognitionExecutor for ReplayExecutor {
        fn run(&self, input: Tensor4D) -> Result<Tensor3D, OcrError> {
            assert_eq!(input.shape()[0], 1);
            assert_eq!(input.shape()[1], 1);
            assert_eq!(input.shape()[2], 32);
            assert!(input.iter().all(|v| (-1.0..=1.0).contains(v)));
            let mut output = Tensor3D::zeros((self.indices.len(), 1, self.classes));
            for (t, &index) in self.indices.iter().enumerate() {
                output[[t, 0, index]] = 5.0;
            }
            Ok(output)
        }
    }

    fn recognizer(indices: Vec<usize>) -> CrnnRecognizer<ReplayExecutor> {
        let decoder = CtcDecoder::new(Alphabet::new(['a', 'b', 'c']).unwrap());
        let executor = ReplayExecutor {
            indices,
            classes: 4,
        };
        CrnnRecognizer::new(executor, decoder, &RecognitionConfig::default()).unwrap()
    }

    #[test]
    fn decodes_replayed_logits() {
        let recognizer = recognizer(vec![0, 1, 1, 2, 0, 3]);
        let crop = RgbImage::new(100, 25);
        assert_eq!(recognizer.recognize(&crop).unwrap(), "abc");
    }

    #[test]
    fn all_blank_output_yields_empty_text() {
        let recognizer = recognizer(vec![0, 0, 0, 0]);
        let crop = RgbImage::new(100, 25);
        assert_eq!(recognizer.recognize(&crop).unwrap(), "");
    }

    #[test]
    fn class_count_mismatch_is_an_inference_error() {
        let decoder = CtcDecoder::new(Alphabet::new(['a', 'b', 'c']).unwrap());
        let executor = ReplayExecutor {
            indices: vec![0, 1],
            classes: 9,
        };
        let recognizer =
            CrnnRecognizer::new(executor, decoder, &RecognitionConfig::default()).unwrap();
        let result = recognizer.recognize(&RgbImage::new(100, 25));
        assert!(matches!(result, Err(OcrError::Inference { .. })));
    }

    #[test]
    fn zero_width_crop_is_invalid_input() {
        let recognizer = recognizer(vec![0]);
        let result = recognizer.recognize(&RgbImage::new(0, 25));
        assert!(matches!(result, Err(OcrError::InvalidInput { .. })));
    }
}
