//! Flat numeric geometry types used throughout detection post-processing.
//!
//! Anchors, proposals, and text lines are fixed-layout structs of floats so
//! the regression and IoU math can run over plain slices without per-element
//! allocation.

use serde::{Deserialize, Serialize};

/// An axis-aligned box `(x0, y0, x1, y1)`.
///
/// Used both for raw anchors and for regression-refined proposals. All
/// width/height arithmetic uses the inclusive pixel convention
/// (`x1 - x0 + 1`), matching the detection network's training contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorBox {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl AnchorBox {
    /// Creates a new box from its edges.
    #[inline]
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Inclusive pixel width.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0 + 1.0
    }

    /// Inclusive pixel height.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0 + 1.0
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) * 0.5
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) * 0.5
    }

    /// Inclusive pixel area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection-over-Union with another box, inclusive convention.
    pub fn iou(&self, other: &AnchorBox) -> f32 {
        let ix = (self.x1.min(other.x1) - self.x0.max(other.x0) + 1.0).max(0.0);
        let iy = (self.y1.min(other.y1) - self.y0.max(other.y0) + 1.0).max(0.0);
        let inter = ix * iy;
        if inter <= 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}

/// An oriented quadrilateral bounding one assembled line of text, with its
/// aggregate score.
///
/// Corner layout, flattened as 8 scalars:
/// `[x_tl, y_tl, x_tr, y_tr, x_bl, y_bl, x_br, y_br]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The four corners, top-left, top-right, bottom-left, bottom-right.
    pub corners: [f32; 8],
    /// Aggregate score of the proposals grouped into this line.
    pub score: f32,
}

impl TextLine {
    /// Creates a text line from its corners and score.
    pub fn new(corners: [f32; 8], score: f32) -> Self {
        Self { corners, score }
    }

    /// Top-left corner.
    #[inline]
    pub fn top_left(&self) -> (f32, f32) {
        (self.corners[0], self.corners[1])
    }

    /// Top-right corner.
    #[inline]
    pub fn top_right(&self) -> (f32, f32) {
        (self.corners[2], self.corners[3])
    }

    /// Bottom-left corner.
    #[inline]
    pub fn bottom_left(&self) -> (f32, f32) {
        (self.corners[4], self.corners[5])
    }

    /// Bottom-right corner.
    #[inline]
    pub fn bottom_right(&self) -> (f32, f32) {
        (self.corners[6], self.corners[7])
    }

    /// Sum of the four corner y coordinates. Sorting lines by this value
    /// ascending approximates top-to-bottom reading order.
    #[inline]
    pub fn y_sum(&self) -> f32 {
        self.corners[1] + self.corners[3] + self.corners[5] + self.corners[7]
    }

    /// Skew angle of the top edge in radians.
    pub fn skew_angle(&self) -> f32 {
        let (x_tl, y_tl) = self.top_left();
        let (x_tr, y_tr) = self.top_right();
        (y_tr - y_tl).atan2(x_tr - x_tl)
    }

    /// Scales every corner by `factor`. Used to map lines detected on a
    /// downscaled image back to source coordinates.
    pub fn scale(&mut self, factor: f32) {
        for c in &mut self.corners {
            *c *= factor;
        }
    }

    /// Widens the line horizontally by `margin` pixels on each side, clamped
    /// to `[0, image_width - 1]`.
    pub fn expand_horizontal(&mut self, margin: f32, image_width: u32) {
        let right = image_width.saturating_sub(1) as f32;
        self.corners[0] = (self.corners[0] - margin).max(0.0);
        self.corners[2] = (self.corners[2] + margin).min(right);
        self.corners[4] = (self.corners[4] - margin).max(0.0);
        self.corners[6] = (self.corners[6] + margin).min(right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = AnchorBox::new(0.0, 0.0, 15.0, 15.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = AnchorBox::new(0.0, 0.0, 10.0, 10.0);
        let b = AnchorBox::new(100.0, 100.0, 110.0, 110.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn expand_clamps_to_image() {
        let mut line = TextLine::new([2.0, 0.0, 60.0, 0.0, 2.0, 10.0, 60.0, 10.0], 0.9);
        line.expand_horizontal(10.0, 64);
        assert_eq!(line.corners[0], 0.0);
        assert_eq!(line.corners[2], 63.0);
        assert_eq!(line.corners[4], 0.0);
        assert_eq!(line.corners[6], 63.0);
    }

    #[test]
    fn skew_angle_of_horizontal_line_is_zero() {
        let line = TextLine::new([0.0, 5.0, 50.0, 5.0, 0.0, 15.0, 50.0, 15.0], 1.0);
        assert_eq!(line.skew_angle(), 0.0);
    }
}
