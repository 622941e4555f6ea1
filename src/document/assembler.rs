//! Streaming document assembly
//!
//! Owns the output lifecycle: open the backing file lazily, emit the
//! header exactly once, emit page sections and blocks as they
//! arrive, emit the footer, release the handle. The assembler is the
//! sole writer of its output file for its whole lifetime.
//!
//! Every write is followed by an explicit flush: a crash after any
//! block leaves previously written content intact and only truncates
//! the tail.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::render::HtmlRenderer;
use super::types::{ContentBlock, DocumentError, Page, Result};
use super::validate;

// ============================================================
// Modes and States
// ============================================================

/// Assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode {
    /// Write through to the backing file after every block, so
    /// partial output is visible while processing continues
    Streaming,
    /// Buffer finished pages and defer all writing to `finalize`
    Batch,
}

/// Writer lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    HeaderWritten,
    PageOpen { number: usize, has_content: bool },
    PageClosed,
    Finalized,
}

// ============================================================
// Document Assembler
// ============================================================

/// Streaming, fault-tolerant document writer.
///
/// Pages are written in first-block arrival order and blocks in
/// `add_block` order; nothing is reordered. A block for a page
/// number different from the open page always starts a new page
/// section, even for a lower number — out-of-order arrivals are not
/// merged back into earlier sections.
pub struct DocumentAssembler {
    output_path: PathBuf,
    renderer: HtmlRenderer,
    mode: AssemblyMode,
    state: State,
    file: Option<File>,
    pages_written: usize,
    buffered: Vec<Page>,
}

impl DocumentAssembler {
    /// Create a streaming assembler
    pub fn streaming(title: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self::with_mode(title, output_path, AssemblyMode::Streaming)
    }

    /// Create a batch assembler that writes everything at `finalize`
    pub fn batch(title: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self::with_mode(title, output_path, AssemblyMode::Batch)
    }

    fn with_mode(
        title: impl Into<String>,
        output_path: impl Into<PathBuf>,
        mode: AssemblyMode,
    ) -> Self {
        Self {
            output_path: output_path.into(),
            renderer: HtmlRenderer::new(title),
            mode,
            state: State::NotStarted,
            file: None,
            pages_written: 0,
            buffered: Vec::new(),
        }
    }

    /// Path of the output document
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Assembly mode
    pub fn mode(&self) -> AssemblyMode {
        self.mode
    }

    /// Number of page sections written so far
    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    /// Append one block to the given page.
    ///
    /// In streaming mode the block is rendered and flushed
    /// immediately; in batch mode it is buffered. Must not be called
    /// after `finalize`.
    pub fn add_block(&mut self, block: ContentBlock, page_number: usize) -> Result<()> {
        if self.state == State::Finalized {
            return Err(DocumentError::AddAfterFinalize);
        }

        match self.mode {
            AssemblyMode::Batch => {
                self.buffer_block(block, page_number);
                Ok(())
            }
            AssemblyMode::Streaming => self.stream_block(block, page_number),
        }
    }

    /// Submit one finished page.
    ///
    /// The page is validated on entry — a page with no renderable
    /// content gains a placeholder block before anything is written
    /// or buffered.
    pub fn add_page(&mut self, page: Page) -> Result<()> {
        if self.state == State::Finalized {
            return Err(DocumentError::AddAfterFinalize);
        }

        let page = validate::validate_page(page);

        match self.mode {
            AssemblyMode::Batch => {
                self.buffered.push(page);
                Ok(())
            }
            AssemblyMode::Streaming => {
                self.ensure_header()?;
                self.close_open_page()?;
                let html = self.renderer.render_page(&page);
                self.write(&html)?;
                self.pages_written += 1;
                self.state = State::PageClosed;
                Ok(())
            }
        }
    }

    /// Close the document: close any open page, write the footer,
    /// release the backing file.
    ///
    /// A document that never received a page still gets one
    /// placeholder page, so the output is never an empty shell.
    /// Calling `finalize` twice is an error.
    pub fn finalize(&mut self) -> Result<()> {
        if self.state == State::Finalized {
            return Err(DocumentError::DoubleFinalize);
        }

        match self.mode {
            AssemblyMode::Batch => self.write_buffered()?,
            AssemblyMode::Streaming => {
                self.ensure_header()?;
                self.close_open_page()?;
            }
        }

        if self.pages_written == 0 {
            debug!("no pages assembled, emitting placeholder page");
            let placeholder = validate::placeholder_page(1);
            let html = self.renderer.render_page(&placeholder);
            self.write(&html)?;
            self.pages_written += 1;
        }

        let footer = self.renderer.footer();
        self.write(&footer)?;

        // Release the handle exactly once.
        self.file = None;
        self.state = State::Finalized;
        Ok(())
    }

    // --------------------------------------------------
    // Streaming internals
    // --------------------------------------------------

    fn stream_block(&mut self, block: ContentBlock, page_number: usize) -> Result<()> {
        self.ensure_header()?;

        let open_number = match self.state {
            State::PageOpen { number, .. } => Some(number),
            _ => None,
        };
        if open_number != Some(page_number) {
            self.close_open_page()?;
            self.open_page(page_number)?;
        }

        if validate::block_has_content(&block) {
            let html = self.renderer.render_block(&block);
            self.write(&html)?;
            if let State::PageOpen { has_content, .. } = &mut self.state {
                *has_content = true;
            }
        } else {
            // The page-level placeholder resolves empty blocks when
            // the section closes.
            debug!(page = page_number, "empty block, deferring to page placeholder");
        }

        Ok(())
    }

    /// Open the backing file and write the document header. Runs at
    /// most once per assembler; subsequent calls are no-ops.
    fn ensure_header(&mut self) -> Result<()> {
        if self.state == State::NotStarted {
            self.file = Some(File::create(&self.output_path)?);
            let header = self.renderer.header();
            self.write(&header)?;
            self.state = State::HeaderWritten;
        }
        Ok(())
    }

    fn open_page(&mut self, number: usize) -> Result<()> {
        let html = self.renderer.page_open(number);
        self.write(&html)?;
        self.state = State::PageOpen {
            number,
            has_content: false,
        };
        Ok(())
    }

    /// Close the currently open page section, if any. A section that
    /// rendered no content is placeholder-padded first so it never
    /// serializes structurally empty.
    fn close_open_page(&mut self) -> Result<()> {
        if let State::PageOpen {
            number,
            has_content,
        } = self.state
        {
            if !has_content {
                warn!(page = number, "page closed without content, inserting placeholder");
                let html = self.renderer.render_block(&validate::placeholder_block());
                self.write(&html)?;
            }
            let html = self.renderer.page_close();
            self.write(&html)?;
            self.pages_written += 1;
            self.state = State::PageClosed;
        }
        Ok(())
    }

    // --------------------------------------------------
    // Batch internals
    // --------------------------------------------------

    /// Append a buffered block, opening a new buffered page whenever
    /// the page number changes arrival-wise (mirroring the streaming
    /// section rule).
    fn buffer_block(&mut self, block: ContentBlock, page_number: usize) {
        match self.buffered.last_mut() {
            Some(page) if page.number == page_number => page.add_block(block),
            _ => self
                .buffered
                .push(Page::with_blocks(page_number, vec![block])),
        }
    }

    fn write_buffered(&mut self) -> Result<()> {
        self.ensure_header()?;
        let pages = std::mem::take(&mut self.buffered);
        for page in pages {
            let page = validate::validate_page(page);
            let html = self.renderer.render_page(&page);
            self.write(&html)?;
            self.pages_written += 1;
        }
        Ok(())
    }

    // --------------------------------------------------
    // Backing store
    // --------------------------------------------------

    /// Append to the backing file and flush. Durability is
    /// prioritized over batching throughput. Failed writes are
    /// propagated, never retried.
    fn write(&mut self, html: &str) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.write_all(html.as_bytes())?;
                file.flush()?;
                Ok(())
            }
            None => Err(DocumentError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "output file not open",
            ))),
        }
    }
}

// ============================================================
// Tests
// ============================================================
