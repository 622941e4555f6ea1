//! OCR collaborator boundary
//!
//! The core never depends on a concrete OCR backend. Recognition is
//! modeled as one capability-checked collaborator behind the
//! [`TextRecognizer`] trait; backend unavailability is a
//! configuration error resolved before the pipeline starts, not a
//! per-call exception to catch.

use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use thiserror::Error;
use tracing::debug;

use crate::layout::LineBox;

// ============================================================
// Error Types
// ============================================================

/// OCR boundary error types
#[derive(Debug, Error)]
pub enum OcrError {
    /// The configured backend command is not on PATH. Surfaces at
    /// startup, never mid-conversion.
    #[error("OCR backend `{0}` not found on PATH")]
    BackendUnavailable(String),

    #[error("OCR command failed: {0}")]
    CommandFailed(String),

    #[error("unparseable OCR output record: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, OcrError>;

// ============================================================
// Recognized Lines
// ============================================================

/// One recognized text line with its confidence and geometry.
///
/// Supplied by the OCR collaborator in arrival order; no ordering
/// guarantee on position or confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f64,
    /// Line bounding box in page raster coordinates
    pub bbox: LineBox,
}

impl RecognizedLine {
    /// Create a new recognized line
    pub fn new(text: impl Into<String>, confidence: f64, bbox: LineBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

// ============================================================
// Recognizer Trait
// ============================================================

/// A text recognition backend.
pub trait TextRecognizer {
    /// Recognize text lines in a page raster.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>>;
}

// ============================================================
// Command Recognizer
// ============================================================

/// Recognizer backed by an external OCR command.
///
/// The command is invoked as `<program> <image.png>` and must print
/// one tab-separated record per recognized line:
///
/// ```text
/// text<TAB>confidence<TAB>x_min<TAB>y_min<TAB>x_max<TAB>y_max
/// ```
pub struct CommandRecognizer {
    program: PathBuf,
}

impl CommandRecognizer {
    /// Resolve `program` on PATH. Fails with
    /// [`OcrError::BackendUnavailable`] when the command is missing,
    /// so misconfiguration surfaces before any page is processed.
    pub fn resolve(program: &str) -> Result<Self> {
        let program = which::which(program)
            .map_err(|_| OcrError::BackendUnavailable(program.to_string()))?;
        debug!(program = %program.display(), "resolved OCR backend");
        Ok(Self { program })
    }

    /// Path of the resolved backend command
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl TextRecognizer for CommandRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>> {
        let workdir = tempfile::tempdir()?;
        let image_path = workdir.path().join("page.png");
        image.save(&image_path)?;

        let output = Command::new(&self.program).arg(&image_path).output()?;
        if !output.status.success() {
            return Err(OcrError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        parse_records(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the tab-separated record stream emitted by the backend.
/// Blank lines are skipped; any malformed record is an error rather
/// than a silent drop.
fn parse_records(raw: &str) -> Result<Vec<RecognizedLine>> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Result<RecognizedLine> {
    let fields: Vec<&str> = record.split('\t').collect();
    if fields.len() != 6 {
        return Err(OcrError::MalformedOutput(record.to_string()));
    }

    let parse = |field: &str| {
        field
            .trim()
            .parse::<f32>()
            .map_err(|_| OcrError::MalformedOutput(record.to_string()))
    };

    let confidence = fields[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| OcrError::MalformedOutput(record.to_string()))?;
    let x_min = parse(fields[2])?;
    let y_min = parse(fields[3])?;
    let x_max = parse(fields[4])?;
    let y_max = parse(fields[5])?;

    Ok(RecognizedLine::new(
        fields[0].to_string(),
        confidence,
        LineBox::new(x_min, y_min, x_max, y_max),
    ))
}

// ============================================================
// Tests
// ============================================================
