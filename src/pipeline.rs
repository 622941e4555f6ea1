//! Conversion pipeline
//!
//! Wires the page source, paragraph clusterer, block factory, and
//! document assembler into one synchronous conversion session. The
//! pipeline object is the explicitly owned session context: every
//! collaborator is passed in, nothing lives in ambient globals.
//!
//! Processing is a strict producer/consumer chain invoked
//! sequentially per page; there is no internal parallelism.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::document::{BlockFactory, ContentBlock, DocumentAssembler, DocumentError, Page};
use crate::layout::{cluster, LineBox};
use crate::ocr::{OcrError, RecognizedLine};
use crate::pdf::PdfError;

// ============================================================
// Error Types
// ============================================================

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("metadata serialization failed: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================
// Collaborator Contracts
// ============================================================

/// Producer of recognized lines, one call per page.
///
/// Implemented by the real PDF+OCR source and by in-memory sources
/// in tests.
pub trait PageSource {
    /// Total number of pages the source will produce
    fn page_count(&self) -> usize;

    /// Recognized lines for one page (1-based), in arrival order
    fn lines_for_page(&mut self, page_number: usize) -> Result<Vec<RecognizedLine>>;
}

/// Progress notification hooks.
///
/// The pipeline calls these at the documented points and never calls
/// `on_finish` before the assembler has finalized the output.
pub trait ProgressCallback {
    /// Called once before the first page is processed
    fn on_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page has been submitted to the assembler
    fn on_page_processed(&self, page_number: usize) {
        let _ = page_number;
    }

    /// Called once, after `finalize` has completed
    fn on_finish(&self, output_path: &Path) {
        let _ = output_path;
    }
}

// ============================================================
// Options and Results
// ============================================================

/// Pipeline behavior switches (already merged from config and CLI)
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Run the formula detection pass per page
    pub detect_formulas: bool,
    /// Write a metadata sidecar next to the output document
    pub generate_metadata: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            detect_formulas: true,
            generate_metadata: false,
        }
    }
}

/// Result of a completed conversion
#[derive(Debug)]
pub struct ConversionResult {
    /// Output document path
    pub output_path: PathBuf,

    /// Number of pages processed
    pub pages_processed: usize,

    /// Total content blocks submitted to the assembler
    pub total_blocks: usize,

    /// Metadata sidecar path (if generated)
    pub metadata_path: Option<PathBuf>,
}

// ============================================================
// Conversion Pipeline
// ============================================================

/// One conversion session from page source to assembled document
pub struct ConversionPipeline<S: PageSource> {
    source: S,
    assembler: DocumentAssembler,
    factory: BlockFactory,
    options: PipelineOptions,
}

impl<S: PageSource> ConversionPipeline<S> {
    /// Create a pipeline with default options
    pub fn new(source: S, assembler: DocumentAssembler) -> Self {
        Self::with_options(source, assembler, PipelineOptions::default())
    }

    /// Create a pipeline with explicit options
    pub fn with_options(
        source: S,
        assembler: DocumentAssembler,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            assembler,
            factory: BlockFactory::new(),
            options,
        }
    }

    /// Run the conversion to completion.
    ///
    /// Recognition failures degrade the affected page to a visible
    /// placeholder; assembler and backing-store errors abort the
    /// run. `finalize` is guaranteed on the success path before
    /// `on_finish` fires.
    pub fn run(mut self, progress: Option<&dyn ProgressCallback>) -> Result<ConversionResult> {
        let total_pages = self.source.page_count();
        info!(pages = total_pages, "starting conversion");

        if let Some(progress) = progress {
            progress.on_start(total_pages);
        }

        let mut total_blocks = 0usize;

        for page_number in 1..=total_pages {
            let blocks = match self.collect_page_blocks(page_number) {
                Ok(blocks) => blocks,
                Err(e) => {
                    warn!(page = page_number, error = %e, "page recognition failed, emitting placeholder");
                    Vec::new()
                }
            };

            if blocks.is_empty() {
                // Validated on entry, so the page surfaces as a
                // placeholder instead of going missing.
                self.assembler.add_page(Page::new(page_number))?;
            } else {
                total_blocks += blocks.len();
                for block in blocks {
                    self.assembler.add_block(block, page_number)?;
                }
            }

            if let Some(progress) = progress {
                progress.on_page_processed(page_number);
            }
        }

        self.assembler.finalize()?;
        let output_path = self.assembler.output_path().to_path_buf();

        let metadata_path = if self.options.generate_metadata {
            Some(self.write_metadata(&output_path, total_pages, total_blocks)?)
        } else {
            None
        };

        if let Some(progress) = progress {
            progress.on_finish(&output_path);
        }

        info!(
            pages = total_pages,
            blocks = total_blocks,
            output = %output_path.display(),
            "conversion finished"
        );

        Ok(ConversionResult {
            output_path,
            pages_processed: total_pages,
            total_blocks,
            metadata_path,
        })
    }

    /// Recognize, cluster, and type one page's content
    fn collect_page_blocks(&mut self, page_number: usize) -> Result<Vec<ContentBlock>> {
        let mut lines = self.source.lines_for_page(page_number)?;

        // The OCR collaborator guarantees no ordering; re-sort by
        // vertical position before clustering.
        lines.sort_by(|a, b| {
            a.bbox
                .y_min
                .partial_cmp(&b.bbox.y_min)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let boxes: Vec<LineBox> = lines.iter().map(|line| line.bbox).collect();
        let spans = cluster(&boxes);

        let mut blocks = Vec::new();
        for span in &spans {
            if let Some(block) = self.factory.paragraph_block(&lines, span) {
                blocks.push(block);
            }
        }

        if self.options.detect_formulas {
            blocks.extend(self.factory.detect_formulas(&lines));
        }

        Ok(blocks)
    }

    /// Write the metadata sidecar next to the output document
    fn write_metadata(
        &self,
        output_path: &Path,
        pages: usize,
        blocks: usize,
    ) -> Result<PathBuf> {
        let metadata = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "pages": pages,
            "blocks": blocks,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });

        let path = output_path.with_extension("meta.json");
        std::fs::write(&path, serde_json::to_string_pretty(&metadata)?)?;
        Ok(path)
    }
}

// ============================================================
// Tests
// ============================================================
