//! Paragraph clustering from line-level geometry
//!
//! Groups a vertically ordered sequence of line boxes into paragraph
//! spans using vertical-gap and horizontal-alignment heuristics. The
//! clustering is a single left-to-right greedy pass: once a paragraph
//! boundary is drawn it is never revisited. That is an accepted
//! approximation, not a bug.

use tracing::warn;

use super::types::{LineBox, ParagraphSpan};

// ============================================================
// Constants
// ============================================================

/// Multiplier applied to the median inter-line gap when deciding
/// whether two adjacent lines belong to the same paragraph.
const GAP_MEDIAN_FACTOR: f32 = 1.5;

/// Absolute lower bound for the gap threshold, in raster pixels.
/// Prevents false splits when line spacing is naturally tiny.
const MIN_GAP_THRESHOLD_PX: f32 = 8.0;

/// Maximum left-margin difference between two lines of the same
/// paragraph. A larger jump signals a fresh indent.
const MAX_INDENT_DIFF_PX: f32 = 40.0;

/// Minimum horizontal overlap ratio between two lines of the same
/// paragraph. Rejects merging lines that occupy disjoint columns.
const MIN_OVERLAP_RATIO: f32 = 0.6;

// ============================================================
// Clustering
// ============================================================

/// Group line boxes into paragraph spans.
///
/// The input is expected sorted ascending by `y_min`; if it is not,
/// an internal copy is sorted first and the returned span indices
/// refer to that vertically sorted order.
///
/// The returned spans partition the input exactly: contiguous,
/// non-overlapping, covering every line once, in ascending vertical
/// order. Lines with non-finite geometry degrade the whole page to a
/// single paragraph instead of failing.
pub fn cluster(lines: &[LineBox]) -> Vec<ParagraphSpan> {
    if lines.is_empty() {
        return Vec::new();
    }

    if lines.iter().any(|l| !l.is_finite()) {
        warn!("non-finite line geometry, treating page as a single paragraph");
        return vec![span_over(lines, 0, lines.len() - 1)];
    }

    let sorted = sorted_by_top(lines);
    let lines = sorted.as_slice();

    if lines.len() == 1 {
        return vec![span_over(lines, 0, 0)];
    }

    let gaps: Vec<f32> = lines.windows(2).map(|w| w[0].gap_to(&w[1])).collect();
    let median_gap = median_of_positive(&gaps);
    let gap_threshold = (GAP_MEDIAN_FACTOR * median_gap).max(MIN_GAP_THRESHOLD_PX);

    let mut spans = Vec::new();
    let mut start = 0usize;

    for i in 0..lines.len() - 1 {
        if !same_paragraph(&lines[i], &lines[i + 1], gap_threshold) {
            spans.push(span_over(lines, start, i));
            start = i + 1;
        }
    }

    // The final open span is always closed at the end.
    spans.push(span_over(lines, start, lines.len() - 1));

    spans
}

/// Merge rule for two vertically adjacent lines. All three criteria
/// must hold for the lines to share a paragraph.
fn same_paragraph(upper: &LineBox, lower: &LineBox, gap_threshold: f32) -> bool {
    let vertical_gap = upper.gap_to(lower);
    let indent_diff = (lower.x_min - upper.x_min).abs();
    let overlap_ratio = upper.horizontal_overlap_ratio(lower);

    vertical_gap < gap_threshold
        && indent_diff < MAX_INDENT_DIFF_PX
        && overlap_ratio > MIN_OVERLAP_RATIO
}

/// Median of the strictly positive gaps (lower middle element for an
/// even count). Gaps from overlapping lines (<= 0) are excluded from
/// the median rather than counted as zero. Returns 0.0 when no
/// positive gap exists, which collapses the gap threshold to the
/// absolute pixel floor.
fn median_of_positive(gaps: &[f32]) -> f32 {
    let mut positive: Vec<f32> = gaps.iter().copied().filter(|g| *g > 0.0).collect();
    if positive.is_empty() {
        return 0.0;
    }

    positive.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    positive[(positive.len() - 1) / 2]
}

fn sorted_by_top(lines: &[LineBox]) -> Vec<LineBox> {
    let mut sorted = lines.to_vec();
    if !sorted.windows(2).all(|w| w[0].y_min <= w[1].y_min) {
        sorted.sort_by(|a, b| {
            a.y_min
                .partial_cmp(&b.y_min)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    sorted
}

fn span_over(lines: &[LineBox], start: usize, end: usize) -> ParagraphSpan {
    ParagraphSpan {
        start,
        end,
        y_start: lines[start].y_min,
        y_end: lines[end].y_max,
    }
}

// ============================================================
// Tests
// ============================================================
