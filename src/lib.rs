//! reflow-pdf - Convert scanned book PDFs into reflowable HTML
//!
//! The pipeline rasterizes each PDF page, hands the raster to an
//! external OCR backend, reconstructs paragraphs from the recognized
//! line geometry, and streams the result into a structurally valid
//! HTML document that is readable while conversion is still running.
//!
//! # Modules
//!
//! - [`layout`] - paragraph clustering from line-level geometry
//! - [`document`] - typed content blocks, validation, HTML assembly
//! - [`ocr`] - the capability-checked OCR collaborator boundary
//! - [`pdf`] - page counting, metadata, and external rasterization
//! - [`pipeline`] - the per-session conversion driver
//! - [`config`] - TOML configuration merged with CLI overrides
//! - [`progress`] - console progress display

pub mod config;
pub mod document;
pub mod layout;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod progress;

// Re-export the primary API surface
pub use config::{CliOverrides, Config, ConfigError};
pub use document::{
    AssemblyMode, BlockFactory, ContentBlock, DocumentAssembler, DocumentError, FormulaBlock,
    HtmlRenderer, Page, TextBlock,
};
pub use layout::{cluster, LineBox, ParagraphSpan};
pub use ocr::{CommandRecognizer, OcrError, RecognizedLine, TextRecognizer};
pub use pdf::{PageRasterizer, PdfDocument, PdfError, PdfPageSource};
pub use pipeline::{
    ConversionPipeline, ConversionResult, PageSource, PipelineError, PipelineOptions,
    ProgressCallback,
};
pub use progress::ConsoleProgress;

/// Process exit codes for the CLI
pub mod exit_codes {
    /// Successful conversion
    pub const SUCCESS: i32 = 0;
    /// Unspecified failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Input PDF missing or unreadable
    pub const INPUT_NOT_FOUND: i32 = 2;
    /// Rasterizer or OCR backend not available on PATH
    pub const BACKEND_UNAVAILABLE: i32 = 3;
}
