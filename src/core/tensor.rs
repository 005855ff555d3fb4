//! Tensor aliases and small numeric helpers shared across the pipeline.

use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3, Array4, ArrayView1};

/// 2D tensor of f32 values.
pub type Tensor2D = Array2<f32>;
/// 3D tensor of f32 values.
pub type Tensor3D = Array3<f32>;
/// 4D tensor of f32 values (batch, channels, height, width).
pub type Tensor4D = Array4<f32>;

/// Converts an RGB image to a mean-subtracted, channel-first detection input
/// tensor of shape (1, 3, height, width).
pub fn rgb_to_detection_tensor(image: &RgbImage, mean: [f32; 3]) -> Tensor4D {
    let (width, height) = image.dimensions();
    let mut tensor = Tensor4D::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 - mean[c];
        }
    }
    tensor
}

/// Converts a grayscale image to a recognition input tensor of shape
/// (1, 1, height, width) with values scaled into [-1, 1].
pub fn gray_to_recognition_tensor(image: &GrayImage) -> Tensor4D {
    let (width, height) = image.dimensions();
    let mut tensor = Tensor4D::zeros((1, 1, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        tensor[[0, 0, y as usize, x as usize]] = (pixel.0[0] as f32 / 255.0 - 0.5) / 0.5;
    }
    tensor
}

/// Numerically stable softmax over a 1D view.
pub fn softmax(row: ArrayView1<'_, f32>) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|v| v / sum).collect()
}

/// Index of the largest value in a 1D view. Ties resolve to the first
/// occurrence so decoding is deterministic.
pub fn argmax(row: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
