//! Aspect-preserving resizes for the two pipeline entry points.

use crate::core::errors::OcrError;
use image::{imageops, GrayImage, RgbImage};
use tracing::debug;

/// Downscales `image` so its height does not exceed `max_height`, keeping
/// aspect ratio. Returns the image (untouched when already small enough)
/// together with the scale factor that maps resized coordinates back to the
/// source (`source = resized * scale`).
pub fn limit_height(image: RgbImage, max_height: u32) -> (RgbImage, f32) {
    let (width, height) = image.dimensions();
    if height <= max_height {
        return (image, 1.0);
    }
    let scale = height as f32 / max_height as f32;
    let new_width = ((width as f32 / scale) as u32).max(1);
    debug!(width, height, new_width, max_height, "downscaling oversized image");
    let resized = imageops::resize(&image, new_width, max_height, imageops::FilterType::Triangle);
    (resized, scale)
}

/// Resizes a grayscale crop to `target_height` keeping aspect ratio, then
/// left-aligns it on a black canvas of width `max(scaled, target_width)`.
///
/// `target_width` pads narrow crops so a batch shares one tensor width;
/// pass the scaled width itself for single-image inference. Zero-sized
/// crops are rejected.
pub fn resize_to_height(
    image: &GrayImage,
    target_height: u32,
    target_width: Option<u32>,
) -> Result<GrayImage, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::invalid_input("cannot resize an empty region"));
    }
    let scaled_width = ((width as f32 * target_height as f32 / height as f32) as u32).max(1);
    let resized = imageops::resize(
        image,
        scaled_width,
        target_height,
        imageops::FilterType::Lanczos3,
    );

    let canvas_width = target_width.unwrap_or(scaled_width).max(scaled_width);
    if canvas_width == scaled_width {
        return Ok(resized);
    }
    let mut canvas = GrayImage::new(canvas_width, target_height);
    imageops::replace(&mut canvas, &resized, 0, 0);
    Ok(canvas)
}
