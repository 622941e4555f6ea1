//! End-to-end pipeline tests over an in-memory page source

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use reflow_pdf::document::validate::EMPTY_PAGE_MARKER;
use reflow_pdf::pipeline::Result as PipelineResult;
use reflow_pdf::{
    ConversionPipeline, DocumentAssembler, LineBox, OcrError, PageSource, PipelineOptions,
    ProgressCallback, RecognizedLine,
};

// ============================================================
// Test Doubles
// ============================================================

/// Page source producing canned recognition results. A `None` page
/// simulates total recognition failure.
struct CannedSource {
    pages: Vec<Option<Vec<RecognizedLine>>>,
}

impl PageSource for CannedSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn lines_for_page(&mut self, page_number: usize) -> PipelineResult<Vec<RecognizedLine>> {
        match &self.pages[page_number - 1] {
            Some(lines) => Ok(lines.clone()),
            None => Err(OcrError::CommandFailed("backend crashed".to_string()).into()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Event {
    Start(usize),
    Page(usize),
    Finish(PathBuf),
}

/// Records every progress hook invocation in order.
struct RecordingProgress {
    events: RefCell<Vec<Event>>,
}

impl RecordingProgress {
    fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
        }
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_start(&self, total_pages: usize) {
        self.events.borrow_mut().push(Event::Start(total_pages));
    }

    fn on_page_processed(&self, page_number: usize) {
        self.events.borrow_mut().push(Event::Page(page_number));
    }

    fn on_finish(&self, output_path: &Path) {
        self.events
            .borrow_mut()
            .push(Event::Finish(output_path.to_path_buf()));
    }
}

fn rec(text: &str, confidence: f64, top: f32) -> RecognizedLine {
    RecognizedLine::new(text, confidence, LineBox::new(0.0, top, 300.0, top + 12.0))
}

// ============================================================
// Tests
// ============================================================

#[test]
fn converts_two_pages_end_to_end() {
    let source = CannedSource {
        pages: vec![
            Some(vec![
                rec("The first paragraph of the", 0.95, 0.0),
                rec("book spans two lines.", 0.94, 14.0),
                rec("A second paragraph.", 0.9, 80.0),
            ]),
            Some(vec![rec("Second page text.", 0.9, 0.0)]),
        ],
    };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.html");
    let assembler = DocumentAssembler::streaming("My Book", &output);
    let progress = RecordingProgress::new();

    let result = ConversionPipeline::new(source, assembler)
        .run(Some(&progress))
        .unwrap();

    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.total_blocks, 3);
    assert_eq!(result.output_path, output);

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("My Book"));
    assert!(html.contains("<p>The first paragraph of the book spans two lines.</p>"));
    assert!(html.contains("<p>A second paragraph.</p>"));
    assert!(html.contains("<p>Second page text.</p>"));
    assert_eq!(html.matches("<article class=\"page\"").count(), 2);
    assert!(html.trim_end().ends_with("</html>"));

    // Progress hooks fire in the documented order, with on_finish
    // only after the assembled document is complete on disk.
    let events = progress.events.into_inner();
    assert_eq!(
        events,
        vec![
            Event::Start(2),
            Event::Page(1),
            Event::Page(2),
            Event::Finish(output),
        ]
    );
}

#[test]
fn failed_page_surfaces_as_placeholder() {
    let source = CannedSource {
        pages: vec![
            Some(vec![rec("Good page.", 0.9, 0.0)]),
            None,
            Some(vec![rec("Also good.", 0.9, 0.0)]),
        ],
    };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.html");
    let assembler = DocumentAssembler::streaming("Book", &output);

    let result = ConversionPipeline::new(source, assembler).run(None).unwrap();
    assert_eq!(result.pages_processed, 3);

    let html = std::fs::read_to_string(&output).unwrap();
    // The failed page is present and visibly marked, not missing.
    assert_eq!(html.matches("<article class=\"page\"").count(), 3);
    assert!(html.contains("Page 2"));
    assert!(html.contains(EMPTY_PAGE_MARKER));
}

#[test]
fn low_confidence_page_degrades_to_placeholder() {
    let source = CannedSource {
        pages: vec![Some(vec![
            rec("noise", 0.1, 0.0),
            rec("more noise", 0.05, 14.0),
        ])],
    };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.html");
    let assembler = DocumentAssembler::streaming("Book", &output);

    let result = ConversionPipeline::new(source, assembler).run(None).unwrap();
    assert_eq!(result.total_blocks, 0);

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains(EMPTY_PAGE_MARKER));
    assert!(!html.contains("noise"));
}

#[test]
fn batch_mode_produces_identical_structure() {
    let pages = vec![Some(vec![rec("Content.", 0.9, 0.0)])];

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("batch.html");
    let assembler = DocumentAssembler::batch("Book", &output);
    let source = CannedSource { pages };

    ConversionPipeline::new(source, assembler).run(None).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("<p>Content.</p>"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn formula_pass_emits_duplicate_blocks() {
    let source = CannedSource {
        pages: vec![Some(vec![rec("E = mc^2", 0.9, 0.0)])],
    };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("formula.html");
    let assembler = DocumentAssembler::streaming("Book", &output);

    ConversionPipeline::new(source, assembler).run(None).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    // The region appears both as text and as a formula container.
    assert!(html.contains("<p>E = mc^2</p>"));
    assert!(html.contains("class=\"formula"));
}

#[test]
fn metadata_sidecar_is_generated_on_request() {
    let source = CannedSource {
        pages: vec![Some(vec![rec("Text.", 0.9, 0.0)])],
    };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("doc.html");
    let assembler = DocumentAssembler::streaming("Book", &output);

    let result = ConversionPipeline::with_options(
        source,
        assembler,
        PipelineOptions {
            detect_formulas: true,
            generate_metadata: true,
        },
    )
    .run(None)
    .unwrap();

    let metadata_path = result.metadata_path.unwrap();
    assert!(metadata_path.exists());

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&metadata_path).unwrap()).unwrap();
    assert_eq!(metadata["pages"], 1);
    assert_eq!(metadata["blocks"], 1);
    assert!(metadata["generated_at"].is_string());
}
