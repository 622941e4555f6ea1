//! Typed block construction
//!
//! Turns paragraph spans plus recognized text into typed content
//! blocks, with confidence gating and classification heuristics for
//! embedded math.

use crate::layout::ParagraphSpan;
use crate::ocr::RecognizedLine;

use super::types::ContentBlock;

// ============================================================
// Constants
// ============================================================

/// Minimum confidence for a recognized line to enter paragraph text.
pub const TEXT_CONFIDENCE_MIN: f64 = 0.3;

/// Minimum confidence for a recognized line to be kept as a formula.
/// Stricter than text: a misclassified formula is worse than a
/// dropped one.
pub const FORMULA_CONFIDENCE_MIN: f64 = 0.6;

/// Characters treated as indicators of embedded math.
const MATH_INDICATORS: &[char] = &[
    '=', '∑', '∫', '√', '≤', '≥', '≠', '±', '×', '÷', 'α', 'β', 'γ', 'π', 'θ', 'λ', 'μ', 'σ',
    '∞', '∂',
];

/// Operators that force display (non-inline) rendering.
const DISPLAY_OPERATORS: &[char] = &['∑', '∫', '∏'];

/// Formulas at least this long render as display blocks.
const DISPLAY_MIN_CHARS: usize = 24;

// ============================================================
// Block Factory
// ============================================================

/// Factory for typed content blocks
#[derive(Debug, Clone)]
pub struct BlockFactory {
    text_confidence_min: f64,
    formula_confidence_min: f64,
}

impl BlockFactory {
    /// Create a factory with the default confidence thresholds
    pub fn new() -> Self {
        Self {
            text_confidence_min: TEXT_CONFIDENCE_MIN,
            formula_confidence_min: FORMULA_CONFIDENCE_MIN,
        }
    }

    /// Build the text block for one paragraph span.
    ///
    /// Lines below the text confidence threshold are dropped
    /// silently (not retried). Returns `None` when the joined,
    /// trimmed text is empty, so the span contributes nothing.
    pub fn paragraph_block(
        &self,
        lines: &[RecognizedLine],
        span: &ParagraphSpan,
    ) -> Option<ContentBlock> {
        let slice = lines.get(span.start..=span.end)?;

        let joined = slice
            .iter()
            .filter(|line| line.confidence > self.text_confidence_min)
            .map(|line| line.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.is_empty() {
            None
        } else {
            Some(ContentBlock::text(joined))
        }
    }

    /// Scan recognized lines for embedded formulas.
    ///
    /// A separate pass from paragraph assembly: a line that carries
    /// math indicators may yield a formula block *and* still appear
    /// in a text block for the same region. The duplication is a
    /// known limitation, accepted by the caller.
    pub fn detect_formulas(&self, lines: &[RecognizedLine]) -> Vec<ContentBlock> {
        lines
            .iter()
            .filter(|line| line.confidence > self.formula_confidence_min)
            .map(|line| line.text.trim())
            .filter(|text| !text.is_empty() && looks_like_formula(text))
            .map(|text| ContentBlock::formula(text, is_inline_formula(text)))
            .collect()
    }
}

impl Default for BlockFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether the text carries math-indicator characters
pub fn looks_like_formula(text: &str) -> bool {
    text.chars().any(|ch| MATH_INDICATORS.contains(&ch))
}

/// Short formulas without display operators render inline
fn is_inline_formula(text: &str) -> bool {
    !text.chars().any(|ch| DISPLAY_OPERATORS.contains(&ch))
        && text.chars().count() < DISPLAY_MIN_CHARS
}

// ============================================================
// Tests
// ============================================================
