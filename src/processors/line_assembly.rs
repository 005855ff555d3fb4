//! Oriented text-line assembly from surviving proposals.
//!
//! Proposals are vertical 16 px strips; a line of text is a run of strips
//! that are horizontally adjacent and vertically aligned. Grouping uses a
//! best-neighbor pair graph rather than full clustering: each proposal gets
//! at most one forward and one backward link, and connected components are
//! the forward chains. Edges always point to a strictly larger x, so
//! traversal terminates without any visited-set bookkeeping.

use crate::core::config::DetectionConfig;
use crate::processors::types::{AnchorBox, TextLine};
use tracing::debug;

/// Padding added to the fitted line height, in pixels. Keeps ascenders and
/// descenders inside the quad.
const LINE_HEIGHT_PADDING: f32 = 2.5;

/// One proposal in the pair graph. Links are indices into the node arena.
#[derive(Debug, Clone, Copy)]
struct ProposalNode {
    bbox: AnchorBox,
    score: f32,
    /// Best succession to the right, if any.
    forward: Option<usize>,
    /// Best precursor to the left, if any.
    backward: Option<usize>,
}

/// Groups proposals into oriented text lines.
#[derive(Debug, Clone)]
pub struct LineAssembler {
    max_horizontal_gap: u32,
    min_vertical_overlap: f32,
    min_size_similarity: f32,
    expand_margin: f32,
}

impl LineAssembler {
    /// Creates an assembler with the grouping thresholds from `config`.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            max_horizontal_gap: config.max_horizontal_gap,
            min_vertical_overlap: config.min_vertical_overlap,
            min_size_similarity: config.min_size_similarity,
            expand_margin: config.expand_margin,
        }
    }

    /// Assembles proposals into oriented text lines in original image
    /// coordinates.
    ///
    /// Every proposal ends up in exactly one component; single-proposal
    /// components still produce a line. Line score is the minimum score of
    /// the grouped proposals. Each line's horizontal extent is widened by
    /// the configured margin, clamped to the image.
    pub fn assemble(
        &self,
        boxes: &[AnchorBox],
        scores: &[f32],
        image_height: u32,
        image_width: u32,
    ) -> Vec<TextLine> {
        debug_assert_eq!(boxes.len(), scores.len());
        if boxes.is_empty() {
            return Vec::new();
        }

        let nodes = self.build_graph(boxes, scores, image_width);
        let components = collect_components(&nodes);
        let mut lines: Vec<TextLine> = components
            .iter()
            .map(|members| self.fit_line(&nodes, members))
            .collect();
        for line in &mut lines {
            line.expand_horizontal(self.expand_margin, image_width);
        }

        debug!(
            proposals = boxes.len(),
            components = components.len(),
            image_height,
            image_width,
            "assembled text lines"
        );
        lines
    }

    /// Builds the best-neighbor pair graph.
    fn build_graph(&self, boxes: &[AnchorBox], scores: &[f32], image_width: u32) -> Vec<ProposalNode> {
        let mut nodes: Vec<ProposalNode> = boxes
            .iter()
            .zip(scores)
            .map(|(&bbox, &score)| ProposalNode {
                bbox,
                score,
                forward: None,
                backward: None,
            })
            .collect();

        // Proposals bucketed by their integer left edge, so the gap scan is
        // a column walk rather than an all-pairs sweep.
        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); image_width as usize];
        for (i, b) in boxes.iter().enumerate() {
            let col = (b.x0.max(0.0) as usize).min(columns.len().saturating_sub(1));
            columns[col].push(i);
        }

        for i in 0..nodes.len() {
            let Some(j) = self.best_succession(&nodes, &columns, i, image_width) else {
                continue;
            };
            // Only link when no precursor candidate of `j` outscores `i`;
            // otherwise the better-scoring neighbor owns the connection.
            if !self.is_best_precursor(&nodes, &columns, i, j) {
                continue;
            }
            match nodes[j].backward {
                Some(k) if nodes[k].score >= nodes[i].score => continue,
                Some(k) => nodes[k].forward = None,
                None => {}
            }
            nodes[i].forward = Some(j);
            nodes[j].backward = Some(i);
        }
        nodes
    }

    /// Highest-scoring vertically-compatible proposal in the first non-empty
    /// column within the horizontal gap to the right of `i`.
    fn best_succession(
        &self,
        nodes: &[ProposalNode],
        columns: &[Vec<usize>],
        i: usize,
        image_width: u32,
    ) -> Option<usize> {
        let start = nodes[i].bbox.x0.max(0.0) as usize + 1;
        let end = (nodes[i].bbox.x0.max(0.0) as usize + self.max_horizontal_gap as usize)
            .min(image_width.saturating_sub(1) as usize);
        for col in start..=end {
            let candidates: Vec<usize> = columns[col]
                .iter()
                .copied()
                .filter(|&j| self.vertically_compatible(&nodes[i].bbox, &nodes[j].bbox))
                .collect();
            if !candidates.is_empty() {
                return candidates
                    .into_iter()
                    .max_by(|&a, &b| {
                        nodes[a]
                            .score
                            .partial_cmp(&nodes[b].score)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then(b.cmp(&a))
                    });
            }
        }
        None
    }

    /// Whether `i` scores at least as high as every precursor candidate of
    /// `j` (the mirror scan, walking columns to the left).
    fn is_best_precursor(
        &self,
        nodes: &[ProposalNode],
        columns: &[Vec<usize>],
        i: usize,
        j: usize,
    ) -> bool {
        let anchor_col = nodes[j].bbox.x0.max(0.0) as usize;
        let end = anchor_col.saturating_sub(self.max_horizontal_gap as usize);
        let mut col = anchor_col;
        while col > end {
            col -= 1;
            let best = columns[col]
                .iter()
                .copied()
                .filter(|&k| self.vertically_compatible(&nodes[j].bbox, &nodes[k].bbox))
                .map(|k| nodes[k].score)
                .fold(f32::NEG_INFINITY, f32::max);
            if best > f32::NEG_INFINITY {
                return nodes[i].score >= best;
            }
        }
        true
    }

    /// Vertical alignment predicate: y-ranges overlap by at least the
    /// configured fraction of the smaller height, and heights are similar.
    fn vertically_compatible(&self, a: &AnchorBox, b: &AnchorBox) -> bool {
        let smaller = a.height().min(b.height());
        let larger = a.height().max(b.height());
        let overlap = (a.y1.min(b.y1) - a.y0.max(b.y0) + 1.0).max(0.0);
        overlap / smaller >= self.min_vertical_overlap
            && smaller / larger >= self.min_size_similarity
    }

    /// Fits one oriented quad through a component's member boxes.
    fn fit_line(&self, nodes: &[ProposalNode], members: &[usize]) -> TextLine {
        let n = members.len() as f32;
        let mean_x = members.iter().map(|&i| nodes[i].bbox.center_x()).sum::<f32>() / n;
        let mean_y = members.iter().map(|&i| nodes[i].bbox.center_y()).sum::<f32>() / n;

        // Least squares of center y on center x; degenerate x-variance
        // (single strip, vertical stack) falls back to a horizontal line.
        let mut cov = 0.0;
        let mut var = 0.0;
        for &i in members {
            let dx = nodes[i].bbox.center_x() - mean_x;
            cov += dx * (nodes[i].bbox.center_y() - mean_y);
            var += dx * dx;
        }
        let slope = if var > f32::EPSILON { cov / var } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        let x_left = members
            .iter()
            .map(|&i| nodes[i].bbox.x0)
            .fold(f32::INFINITY, f32::min);
        let x_right = members
            .iter()
            .map(|&i| nodes[i].bbox.x1)
            .fold(f32::NEG_INFINITY, f32::max);
        let mean_height =
            members.iter().map(|&i| nodes[i].bbox.height()).sum::<f32>() / n + LINE_HEIGHT_PADDING;
        let half_height = mean_height * 0.5;

        let score = members
            .iter()
            .map(|&i| nodes[i].score)
            .fold(f32::INFINITY, f32::min);

        TextLine::new(
            [
                x_left,
                slope * x_left + intercept - half_height,
                x_right,
                slope * x_right + intercept - half_height,
                x_left,
                slope * x_left + intercept + half_height,
                x_right,
                slope * x_right + intercept + half_height,
            ],
            score,
        )
    }
}

/// Walks the forward chains starting from nodes with no backward link.
/// Every node belongs to exactly one chain.
fn collect_components(nodes: &[ProposalNode]) -> Vec<Vec<usize>> {
    let mut components = Vec::new();
    for start in 0..nodes.len() {
        if nodes[start].backward.is_some() {
            continue;
        }
        let mut members = vec![start];
        let mut current = start;
        while let Some(next) = nodes[current].forward {
            members.push(next);
            current = next;
        }
        components.push(members);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> LineAssembler {
        LineAssembler::from_config(&DetectionConfig::default())
    }

    fn strip(x0: f32, y0: f32, y1: f32) -> AnchorBox {
        AnchorBox::new(x0, y0, x0 + 15.0, y1)
    }

    #[test]
    fn adjacent_aligned_strips_form_one_line() {
        let boxes = vec![
            strip(0.0, 10.0, 30.0),
            strip(16.0, 10.0, 30.0),
            strip(32.0, 10.0, 30.0),
            strip(48.0, 10.0, 30.0),
        ];
        let scores = vec![0.9, 0.8, 0.95, 0.7];
        let lines = assembler().assemble(&boxes, &scores, 64, 128);
        assert_eq!(lines.len(), 1);
        let line = lines[0];
        // Minimum member score.
        assert!((line.score - 0.7).abs() < 1e-6);
        // Horizontal extent covers all strips plus the 10 px margin.
        assert!((line.corners[0] - 0.0).abs() < 1e-4); // 0 - 10 clamped
        assert!((line.corners[2] - 73.0).abs() < 1e-4); // 63 + 10
        // Flat layout: top edge is horizontal.
        assert!((line.corners[1] - line.corners[3]).abs() < 1e-4);
    }

    #[test]
    fn vertically_distant_strips_stay_separate() {
        let boxes = vec![strip(0.0, 0.0, 20.0), strip(16.0, 100.0, 120.0)];
        let lines = assembler().assemble(&boxes, &[0.9, 0.9], 200, 128);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn gap_larger_than_threshold_splits_lines() {
        // 40 px between strip edges, above the 16 px default gap.
        let boxes = vec![strip(0.0, 10.0, 30.0), strip(56.0, 10.0, 30.0)];
        let lines = assembler().assemble(&boxes, &[0.9, 0.9], 64, 128);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn single_proposal_still_produces_a_line() {
        let boxes = vec![strip(16.0, 10.0, 30.0)];
        let lines = assembler().assemble(&boxes, &[0.6], 64, 128);
        assert_eq!(lines.len(), 1);
        assert!((lines[0].score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn sloped_strips_produce_oriented_quad() {
        // Centers climb 4 px per strip; the fitted top edge must climb too.
        let boxes = vec![
            strip(0.0, 20.0, 40.0),
            strip(16.0, 24.0, 44.0),
            strip(32.0, 28.0, 48.0),
        ];
        let lines = assembler().assemble(&boxes, &[0.9, 0.9, 0.9], 128, 128);
        assert_eq!(lines.len(), 1);
        let line = lines[0];
        assert!(line.corners[3] > line.corners[1], "top edge should slope down-right");
        assert!(line.skew_angle() > 0.0);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(assembler().assemble(&[], &[], 64, 64).is_empty());
    }

    #[test]
    fn height_mismatch_blocks_grouping() {
        // Same y-center but very different heights fails size similarity.
        let boxes = vec![strip(0.0, 0.0, 100.0), strip(16.0, 40.0, 60.0)];
        let lines = assembler().assemble(&boxes, &[0.9, 0.9], 200, 128);
        assert_eq!(lines.len(), 2);
    }
}
