//! Anchor generation, box regression, clipping, and proposal filtering.
//!
//! These are the first three stages of detection post-processing. All of
//! them are pure functions of their inputs; anchor layout is the contract
//! that ties the flattened executor tensors back to image coordinates.

use crate::processors::types::AnchorBox;

/// Generator for the fixed candidate-box set of the detection network.
///
/// For every grid cell at `stride` intervals it emits one anchor per base
/// height, centered on the cell, with width exactly `stride`. The emission
/// order is rows, then columns, then heights — the same flattening the
/// detection network applies to its output tensors.
#[derive(Debug, Clone)]
pub struct AnchorGrid {
    stride: u32,
    base_heights: Vec<f32>,
}

impl AnchorGrid {
    /// Creates a grid with the given stride and base anchor heights.
    pub fn new(stride: u32, base_heights: Vec<f32>) -> Self {
        Self {
            stride,
            base_heights,
        }
    }

    /// Number of anchors generated per grid cell.
    pub fn anchors_per_cell(&self) -> usize {
        self.base_heights.len()
    }

    /// Number of anchors generated for an image of the given size:
    /// `⌊h/stride⌋ · ⌊w/stride⌋ · |base_heights|`.
    pub fn anchor_count(&self, height: u32, width: u32) -> usize {
        let cells_y = (height / self.stride) as usize;
        let cells_x = (width / self.stride) as usize;
        cells_y * cells_x * self.base_heights.len()
    }

    /// Generates the full anchor set for an image of the given size.
    ///
    /// Returns an empty vector when either dimension is below the stride.
    pub fn generate(&self, height: u32, width: u32) -> Vec<AnchorBox> {
        let cells_y = height / self.stride;
        let cells_x = width / self.stride;
        let stride = self.stride as f32;
        // Base cell spans [0, stride - 1]; anchors share its center.
        let center = (stride - 1.0) * 0.5;
        let half_width = stride * 0.5;

        let mut anchors =
            Vec::with_capacity(cells_y as usize * cells_x as usize * self.base_heights.len());
        for cy in 0..cells_y {
            let shift_y = cy as f32 * stride;
            for cx in 0..cells_x {
                let shift_x = cx as f32 * stride;
                for &base_height in &self.base_heights {
                    let half_height = base_height * 0.5;
                    anchors.push(AnchorBox::new(
                        shift_x + center - half_width,
                        shift_y + center - half_height,
                        shift_x + center + half_width,
                        shift_y + center + half_height,
                    ));
                }
            }
        }
        anchors
    }
}

/// Applies vertical regression deltas to anchors.
///
/// `deltas[i] = (vc, vh)`: the refined vertical center is
/// `vc · anchor_height + anchor_center_y` and the refined height is
/// `exp(vh) · anchor_height`. The horizontal extent is recomputed around the
/// anchor center at the fixed anchor width — the detector only regresses
/// vertical position.
pub fn apply_regression(anchors: &[AnchorBox], deltas: &[(f32, f32)], stride: u32) -> Vec<AnchorBox> {
    debug_assert_eq!(anchors.len(), deltas.len());
    let half_width = stride as f32 * 0.5;
    anchors
        .iter()
        .zip(deltas)
        .map(|(anchor, &(vc, vh))| {
            let anchor_height = anchor.height();
            let center_y = vc * anchor_height + anchor.center_y();
            let height = vh.exp() * anchor_height;
            let center_x = anchor.center_x();
            AnchorBox::new(
                center_x - half_width,
                center_y - height * 0.5,
                center_x + half_width,
                center_y + height * 0.5,
            )
        })
        .collect()
}

/// Clamps every box edge into `[0, width - 1] × [0, height - 1]`.
pub fn clip_boxes(boxes: &mut [AnchorBox], height: u32, width: u32) {
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;
    for b in boxes {
        b.x0 = b.x0.clamp(0.0, max_x);
        b.y0 = b.y0.clamp(0.0, max_y);
        b.x1 = b.x1.clamp(0.0, max_x);
        b.y1 = b.y1.clamp(0.0, max_y);
    }
}

/// Returns the indices of boxes whose score exceeds `threshold`, preserving
/// input order. Confidence filtering only; size filtering is a second pass.
pub fn filter_by_score(scores: &[f32], threshold: f32) -> Vec<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Returns the indices of boxes whose width and height are both at least
/// `min_size` pixels, preserving input order. Removes boxes left degenerate
/// by clipping.
pub fn filter_by_size(boxes: &[AnchorBox], min_size: f32) -> Vec<usize> {
    boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.width() >= min_size && b.height() >= min_size)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BASE_ANCHOR_HEIGHTS;

    fn grid() -> AnchorGrid {
        AnchorGrid::new(16, BASE_ANCHOR_HEIGHTS.to_vec())
    }

    #[test]
    fn anchor_count_matches_formula() {
        let grid = grid();
        for (h, w) in [(16, 16), (64, 64), (100, 240), (719, 1281)] {
            let anchors = grid.generate(h, w);
            assert_eq!(
                anchors.len(),
                (h as usize / 16) * (w as usize / 16) * BASE_ANCHOR_HEIGHTS.len()
            );
            assert_eq!(anchors.len(), grid.anchor_count(h, w));
        }
    }

    #[test]
    fn undersized_image_yields_no_anchors() {
        assert!(grid().generate(15, 640).is_empty());
        assert!(grid().generate(640, 15).is_empty());
    }

    #[test]
    fn anchors_are_centered_with_fixed_width() {
        let anchors = grid().generate(32, 32);
        // First anchor: cell (0, 0), height 11.
        let first = anchors[0];
        assert_eq!(first.x0, -0.5);
        assert_eq!(first.x1, 15.5);
        assert!((first.center_y() - 7.5).abs() < 1e-6);
        assert!((first.height() - 12.0).abs() < 1e-6);
        // Cell-major order: second cell of the first row starts at x = 16.
        let next_cell = anchors[BASE_ANCHOR_HEIGHTS.len()];
        assert_eq!(next_cell.x0, 15.5);
        assert_eq!(next_cell.x1, 31.5);
    }

    #[test]
    fn regression_moves_center_and_scales_height() {
        let anchors = vec![AnchorBox::new(0.0, 0.0, 15.0, 15.0)];
        let refined = apply_regression(&anchors, &[(0.5, 0.0)], 16);
        let anchor_height = 16.0;
        assert!((refined[0].center_y() - (7.5 + 0.5 * anchor_height)).abs() < 1e-5);
        assert!((refined[0].height() - anchor_height).abs() < 1e-5);
        // Horizontal extent inherited from the anchor.
        assert_eq!(refined[0].x0, -0.5);
        assert_eq!(refined[0].x1, 15.5);

        let scaled = apply_regression(&anchors, &[(0.0, 2.0_f32.ln())], 16);
        assert!((scaled[0].height() - 32.0).abs() < 1e-4);
    }

    #[test]
    fn clip_keeps_boxes_inside_image() {
        let mut boxes = vec![AnchorBox::new(-10.0, -5.0, 700.0, 500.0)];
        clip_boxes(&mut boxes, 480, 640);
        assert_eq!(boxes[0], AnchorBox::new(0.0, 0.0, 639.0, 479.0));
    }

    #[test]
    fn score_filter_preserves_order() {
        let kept = filter_by_score(&[0.9, 0.2, 0.7, 0.5], 0.5);
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn size_filter_drops_degenerate_boxes() {
        let boxes = vec![
            AnchorBox::new(0.0, 0.0, 15.0, 15.0),
            AnchorBox::new(0.0, 0.0, 3.0, 15.0),
            AnchorBox::new(0.0, 0.0, 15.0, 3.0),
        ];
        assert_eq!(filter_by_size(&boxes, 16.0), vec![0]);
    }
}
