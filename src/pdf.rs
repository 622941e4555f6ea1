//! PDF document boundary
//!
//! PDF decoding and rasterization are external concerns: page
//! counting and title metadata come from `lopdf`, page rasters from
//! the `pdftoppm` command resolved on PATH before the pipeline
//! starts.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

use crate::ocr::TextRecognizer;
use crate::pipeline::{PageSource, PipelineError};

// ============================================================
// Error Types
// ============================================================

/// PDF boundary error types
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid PDF: {0}")]
    Invalid(String),

    /// The rasterizer command is not on PATH. Surfaces at startup.
    #[error("rasterizer command `{0}` not found on PATH")]
    RasterizerUnavailable(String),

    #[error("rasterization failed for page {page}: {message}")]
    RasterizeFailed { page: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PdfError>;

// ============================================================
// PDF Document
// ============================================================

/// An opened PDF file, used for page counting and metadata only.
/// Page content never flows through `lopdf`; rasters do.
pub struct PdfDocument {
    path: PathBuf,
    document: lopdf::Document,
}

impl PdfDocument {
    /// Open and parse the PDF at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PdfError::NotFound(path.to_path_buf()));
        }
        let document =
            lopdf::Document::load(path).map_err(|e| PdfError::Invalid(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Path the document was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Document title from the Info dictionary, if present
    pub fn title(&self) -> Option<String> {
        let info = match self.document.trailer.get(b"Info").ok()? {
            lopdf::Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let title = info.as_dict().ok()?.get(b"Title").ok()?;
        match title {
            lopdf::Object::String(bytes, _) => {
                let decoded = decode_text_string(bytes);
                let trimmed = decoded.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            _ => None,
        }
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise
/// treated as Latin-ish bytes.
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

// ============================================================
// Page Rasterizer
// ============================================================

/// Rasterizes single PDF pages through the external `pdftoppm`
/// command into a private temp directory.
pub struct PageRasterizer {
    program: PathBuf,
    dpi: u32,
    workdir: TempDir,
}

impl PageRasterizer {
    /// The rasterizer command expected on PATH
    pub const PROGRAM: &'static str = "pdftoppm";

    /// Resolve the rasterizer on PATH. Fails with
    /// [`PdfError::RasterizerUnavailable`] when missing, so the
    /// dependency surfaces before any page is processed.
    pub fn resolve(dpi: u32) -> Result<Self> {
        let program = which::which(Self::PROGRAM)
            .map_err(|_| PdfError::RasterizerUnavailable(Self::PROGRAM.to_string()))?;
        let workdir = tempfile::tempdir()?;
        debug!(program = %program.display(), dpi, "resolved rasterizer");
        Ok(Self {
            program,
            dpi,
            workdir,
        })
    }

    /// Rasterize one page (1-based) to an in-memory image
    pub fn rasterize(&self, pdf: &Path, page_number: usize) -> Result<DynamicImage> {
        let prefix = self.workdir.path().join(format!("page-{}", page_number));
        let page_arg = page_number.to_string();

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix)
            .output()?;

        if !output.status.success() {
            return Err(PdfError::RasterizeFailed {
                page: page_number,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(image::open(prefix.with_extension("png"))?)
    }
}

// ============================================================
// Page Source
// ============================================================

/// The production page source: rasterize each page, then hand the
/// raster to the OCR collaborator.
pub struct PdfPageSource {
    document: PdfDocument,
    rasterizer: PageRasterizer,
    recognizer: Box<dyn TextRecognizer>,
}

impl PdfPageSource {
    /// Combine an opened document, a resolved rasterizer, and a
    /// resolved recognizer into a page source
    pub fn new(
        document: PdfDocument,
        rasterizer: PageRasterizer,
        recognizer: Box<dyn TextRecognizer>,
    ) -> Self {
        Self {
            document,
            rasterizer,
            recognizer,
        }
    }
}

impl PageSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.document.page_count()
    }

    fn lines_for_page(
        &mut self,
        page_number: usize,
    ) -> std::result::Result<Vec<crate::ocr::RecognizedLine>, PipelineError> {
        let image = self.rasterizer.rasterize(self.document.path(), page_number)?;
        Ok(self.recognizer.recognize(&image)?)
    }
}

// ============================================================
// Tests
// ============================================================
