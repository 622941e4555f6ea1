//! Defensive content validation
//!
//! Guarantees that every page, and the document as a whole, renders
//! to a non-empty structural unit. Validation happens once, at the
//! point content enters the assembler; there is no post-hoc repair
//! pass.

use super::types::{ContentBlock, Page};

/// Marker substituted for a page with no extractable content.
pub const EMPTY_PAGE_MARKER: &str = "No text could be extracted from this page.";

/// Marker substituted when the whole document produced no pages.
pub const EMPTY_DOCUMENT_MARKER: &str =
    "No pages with extractable content were found in this document.";

/// Check whether a block carries renderable content.
pub fn block_has_content(block: &ContentBlock) -> bool {
    match block {
        ContentBlock::Text(text) => !text.text.trim().is_empty(),
        ContentBlock::Formula(formula) => !formula.source.trim().is_empty(),
    }
}

/// Check whether any block on the page carries renderable content.
pub fn page_has_content(page: &Page) -> bool {
    page.blocks.iter().any(block_has_content)
}

/// Ensure the page renders to a non-empty structural unit.
///
/// A page with zero blocks, or whose blocks all reduce to
/// empty/whitespace content, gains one placeholder text block.
/// Idempotent: an already-valid page passes through unchanged.
pub fn validate_page(mut page: Page) -> Page {
    if !page_has_content(&page) {
        page.blocks.push(placeholder_block());
    }
    page
}

/// The placeholder block inserted into structurally empty pages.
pub fn placeholder_block() -> ContentBlock {
    ContentBlock::text(EMPTY_PAGE_MARKER)
}

/// The placeholder page emitted when the document has no pages at
/// all, so the output never serializes as an empty shell.
pub fn placeholder_page(number: usize) -> Page {
    Page::with_blocks(number, vec![ContentBlock::text(EMPTY_DOCUMENT_MARKER)])
}
