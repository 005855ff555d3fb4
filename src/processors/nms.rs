//! Greedy non-maximum suppression over axis-aligned proposals.

use crate::processors::types::AnchorBox;

/// Greedy IoU-based suppression.
///
/// Repeatedly keeps the highest-scoring remaining box and discards every
/// other remaining box whose IoU with it exceeds `iou_threshold`. Equal
/// scores break ties on the original index, so the result is reproducible
/// for any input order. Returned indices are in descending score order.
///
/// Every pair of kept boxes has IoU ≤ `iou_threshold`.
pub fn suppress(boxes: &[AnchorBox], scores: &[f32], iou_threshold: f32) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    // Descending score, stable on index for equal scores.
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut suppressed = vec![false; boxes.len()];
    let mut kept = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        kept.push(i);
        for &j in &order[pos + 1..] {
            if !suppressed[j] && boxes[i].iou(&boxes[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_box_passes_through() {
        let boxes = vec![AnchorBox::new(0.0, 0.0, 15.0, 15.0)];
        assert_eq!(suppress(&boxes, &[0.8], 0.3), vec![0]);
    }

    #[test]
    fn overlapping_pair_keeps_higher_score() {
        // Two 20x10 boxes offset so IoU = 0.5: intersection 10x10 + inclusive
        // convention.
        let a = AnchorBox::new(0.0, 0.0, 19.0, 9.0);
        let b = AnchorBox::new(5.0, 0.0, 24.0, 9.0);
        let iou = a.iou(&b);
        assert!(iou > 0.3 && iou < 1.0, "fixture IoU = {iou}");
        let kept = suppress(&[a, b], &[0.9, 0.6], 0.3);
        assert_eq!(kept, vec![0]);
    }

    #[test]
    fn disjoint_boxes_all_kept_in_score_order() {
        let boxes = vec![
            AnchorBox::new(0.0, 0.0, 15.0, 15.0),
            AnchorBox::new(100.0, 0.0, 115.0, 15.0),
            AnchorBox::new(200.0, 0.0, 215.0, 15.0),
        ];
        let kept = suppress(&boxes, &[0.5, 0.9, 0.7], 0.3);
        assert_eq!(kept, vec![1, 2, 0]);
    }

    #[test]
    fn equal_scores_break_ties_on_index() {
        let a = AnchorBox::new(0.0, 0.0, 19.0, 9.0);
        let b = AnchorBox::new(1.0, 0.0, 20.0, 9.0);
        let kept = suppress(&[a, b], &[0.7, 0.7], 0.3);
        assert_eq!(kept, vec![0]);
    }

    #[test]
    fn kept_set_satisfies_pairwise_iou_bound() {
        // A chain of heavily overlapping boxes with varied scores.
        let boxes: Vec<AnchorBox> = (0..10)
            .map(|i| AnchorBox::new(i as f32 * 3.0, 0.0, i as f32 * 3.0 + 19.0, 9.0))
            .collect();
        let scores: Vec<f32> = (0..10).map(|i| 0.5 + 0.04 * (i % 5) as f32).collect();
        let kept = suppress(&boxes, &scores, 0.3);
        for (a, &i) in kept.iter().enumerate() {
            for &j in &kept[a + 1..] {
                assert!(boxes[i].iou(&boxes[j]) <= 0.3);
            }
        }
    }
}
