//! Common types for the document module

use thiserror::Error;

// ============================================================
// Error Types
// ============================================================

/// Document assembly error types
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Caller misuse: content submitted to a finalized assembler.
    #[error("block submitted after finalize")]
    AddAfterFinalize,

    /// Caller misuse: the document lifecycle ends exactly once.
    #[error("finalize called twice")]
    DoubleFinalize,

    /// The backing store rejected a write. Never retried.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

// ============================================================
// Content Blocks
// ============================================================

/// A unit of document content.
///
/// Exhaustively matched in the renderer and validator, so adding a
/// new block kind is a compile-time-checked extension.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// A reflowed text paragraph
    Text(TextBlock),
    /// A recognized formula, passed through as markup source
    Formula(FormulaBlock),
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock { text: text.into() })
    }

    /// Create a formula block
    pub fn formula(source: impl Into<String>, inline: bool) -> Self {
        ContentBlock::Formula(FormulaBlock {
            source: source.into(),
            inline,
        })
    }
}

/// A paragraph of recognized text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// The paragraph text
    pub text: String,
}

/// A recognized formula
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaBlock {
    /// Formula source (MathML or LaTeX passed through from recognition)
    pub source: String,
    /// Inline formula, rendered inside the text flow rather than as
    /// a display block
    pub inline: bool,
}

// ============================================================
// Pages
// ============================================================

/// Content assembled for a single page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number (1-based)
    pub number: usize,

    /// Blocks in render order
    pub blocks: Vec<ContentBlock>,
}

impl Page {
    /// Create an empty page
    pub fn new(number: usize) -> Self {
        Self {
            number,
            blocks: Vec::new(),
        }
    }

    /// Create a page with initial blocks
    pub fn with_blocks(number: usize, blocks: Vec<ContentBlock>) -> Self {
        Self { number, blocks }
    }

    /// Append a block
    pub fn add_block(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_block_constructors() {
        let text = ContentBlock::text("Hello");
        assert_eq!(text, ContentBlock::Text(TextBlock { text: "Hello".to_string() }));

        let formula = ContentBlock::formula("E = mc^2", true);
        match formula {
            ContentBlock::Formula(f) => {
                assert_eq!(f.source, "E = mc^2");
                assert!(f.inline);
            }
            ContentBlock::Text(_) => panic!("expected formula"),
        }
    }

    #[test]
    fn test_page() {
        let mut page = Page::new(3);
        assert_eq!(page.number, 3);
        assert!(page.blocks.is_empty());

        page.add_block(ContentBlock::text("First"));
        page.add_block(ContentBlock::text("Second"));
        assert_eq!(page.blocks.len(), 2);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DocumentError::AddAfterFinalize.to_string(),
            "block submitted after finalize"
        );
        assert_eq!(
            DocumentError::DoubleFinalize.to_string(),
            "finalize called twice"
        );
    }
}
