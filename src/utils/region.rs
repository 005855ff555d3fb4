//! Skew-corrected region extraction.
//!
//! Each assembled text line is an oriented quad. Extraction rotates the
//! whole source image about its center so the line's top edge becomes
//! horizontal, maps the quad's opposite corners through the same transform,
//! and crops the axis-aligned rectangle between them.

use crate::core::config::RecognitionConfig;
use crate::processors::types::TextLine;
use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::debug;

/// Border fill for pixels rotated in from outside the source image.
const BORDER_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Extracts skew-corrected crops for assembled text lines.
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    reject_tall_regions: bool,
    adjust_regions: bool,
}

impl RegionExtractor {
    /// Creates an extractor with the policy flags from `config`.
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            reject_tall_regions: config.reject_tall_regions,
            adjust_regions: config.adjust_regions,
        }
    }

    /// Cuts the line's quad out of `image`, correcting skew.
    ///
    /// Returns `None` — a skip, not an error — when the crop collapses to
    /// zero area or, under the tall-region policy, when it comes out taller
    /// than wide.
    pub fn extract(&self, image: &RgbImage, line: &TextLine) -> Option<RgbImage> {
        let (width, height) = image.dimensions();
        let (mut x_tl, mut y_tl) = line.top_left();
        let (mut x_br, mut y_br) = line.bottom_right();

        if self.adjust_regions {
            // Fractional padding around the quad, kept one pixel inside the
            // image.
            let pad_x = (x_br - x_tl) * 0.1;
            let pad_y = (y_br - y_tl) * 0.2;
            x_tl = (x_tl - pad_x).max(1.0);
            y_tl = (y_tl - pad_y).max(1.0);
            x_br = (x_br + pad_x).min(width as f32 - 2.0);
            y_br = (y_br + pad_y).min(height as f32 - 2.0);
        } else {
            x_tl = x_tl.max(1.0);
            y_tl = y_tl.max(1.0);
            x_br = x_br.min(width as f32 - 2.0);
            y_br = y_br.min(height as f32 - 2.0);
        }

        let angle = line.skew_angle();
        let (rotated, projection) = rotate_about_center_expanded(image, angle);

        let (rx_tl, ry_tl) = projection * (x_tl, y_tl);
        let (rx_br, ry_br) = projection * (x_br, y_br);

        // Clamp to a 1 px margin from the rotated canvas edges.
        let x_start = (rx_tl as i64).max(1);
        let y_start = (ry_tl as i64).max(1);
        let x_end = (rx_br as i64).min(rotated.width() as i64 - 1);
        let y_end = (ry_br as i64).min(rotated.height() as i64 - 1);

        let crop_width = x_end - x_start;
        let crop_height = y_end - y_start;
        if crop_width < 1 || crop_height < 1 {
            debug!(angle, "skipping zero-area crop");
            return None;
        }
        if self.reject_tall_regions && crop_height > crop_width {
            debug!(crop_width, crop_height, "skipping taller-than-wide crop");
            return None;
        }

        Some(
            imageops::crop_imm(
                &rotated,
                x_start as u32,
                y_start as u32,
                crop_width as u32,
                crop_height as u32,
            )
            .to_image(),
        )
    }
}

/// Rotates `image` about its center by `-angle` radians onto an expanded
/// canvas that holds the whole rotated frame, and returns the canvas along
/// with the forward affine that maps source points onto it.
///
/// The rotation sense undoes a skew of `angle`, so a line whose top edge
/// climbs by `angle` comes out horizontal.
pub fn rotate_about_center_expanded(image: &RgbImage, angle: f32) -> (RgbImage, Projection) {
    let (width, height) = image.dimensions();
    let (sin, cos) = angle.sin_cos();
    let new_width = (height as f32 * sin.abs() + width as f32 * cos.abs()) as i64;
    let new_height = (width as f32 * sin.abs() + height as f32 * cos.abs()) as i64;
    let new_width = new_width.max(1) as u32;
    let new_height = new_height.max(1) as u32;

    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let shift_x = ((new_width as i64 - width as i64) / 2) as f32;
    let shift_y = ((new_height as i64 - height as i64) / 2) as f32;

    let projection = Projection::translate(shift_x, shift_y)
        * Projection::translate(cx, cy)
        * Projection::rotate(-angle)
        * Projection::translate(-cx, -cy);

    let mut canvas = RgbImage::from_pixel(new_width, new_height, BORDER_FILL);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        BORDER_FILL,
        &mut canvas,
    );
    (canvas, projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::types::TextLine;

    fn extractor() -> RegionExtractor {
        RegionExtractor::from_config(&RecognitionConfig::default())
    }

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn axis_aligned_quad_crops_directly() {
        let image = checkerboard(100, 60);
        let line = TextLine::new([10.0, 20.0, 80.0, 20.0, 10.0, 40.0, 80.0, 40.0], 0.9);
        let crop = extractor().extract(&image, &line).unwrap();
        assert_eq!(crop.dimensions(), (70, 20));
    }

    #[test]
    fn tall_crop_is_rejected_by_policy() {
        let image = checkerboard(100, 100);
        let line = TextLine::new([10.0, 5.0, 20.0, 5.0, 10.0, 90.0, 20.0, 90.0], 0.9);
        assert!(extractor().extract(&image, &line).is_none());

        let permissive = RegionExtractor::from_config(&RecognitionConfig {
            reject_tall_regions: false,
            ..RecognitionConfig::default()
        });
        assert!(permissive.extract(&image, &line).is_some());
    }

    #[test]
    fn zero_area_quad_is_skipped() {
        let image = checkerboard(100, 60);
        let line = TextLine::new([50.0, 30.0, 50.0, 30.0, 50.0, 30.0, 50.0, 30.0], 0.9);
        assert!(extractor().extract(&image, &line).is_none());
    }

    #[test]
    fn rotation_expands_canvas_and_maps_center_to_center() {
        let image = checkerboard(100, 60);
        let angle = std::f32::consts::FRAC_PI_6;
        let (rotated, projection) = rotate_about_center_expanded(&image, angle);
        assert!(rotated.width() > image.width());
        assert!(rotated.height() > image.height());
        // The source center lands on (old center + canvas shift); for the
        // symmetric expansion that is close to the new center.
        let (cx, cy) = projection * (50.0, 30.0);
        assert!((cx - rotated.width() as f32 / 2.0).abs() < 2.0);
        assert!((cy - rotated.height() as f32 / 2.0).abs() < 2.0);
    }

    #[test]
    fn skewed_quad_yields_wide_crop() {
        let image = checkerboard(200, 120);
        // Top edge climbing 20 px over 150 px of width.
        let line = TextLine::new(
            [20.0, 50.0, 170.0, 70.0, 20.0, 70.0, 170.0, 90.0],
            0.9,
        );
        let crop = extractor().extract(&image, &line).unwrap();
        assert!(crop.width() > crop.height());
    }

    #[test]
    fn adjusted_extraction_pads_the_quad() {
        let image = checkerboard(200, 120);
        let line = TextLine::new([50.0, 40.0, 150.0, 40.0, 50.0, 60.0, 150.0, 60.0], 0.9);
        let plain = extractor().extract(&image, &line).unwrap();
        let adjusted = RegionExtractor::from_config(&RecognitionConfig {
            adjust_regions: true,
            ..RecognitionConfig::default()
        })
        .extract(&image, &line)
        .unwrap();
        assert!(adjusted.width() > plain.width());
        assert!(adjusted.height() > plain.height());
    }
}
