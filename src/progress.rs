//! Console progress reporting
//!
//! Terminal progress display for the CLI, implementing the
//! pipeline's notification hooks with an `indicatif` bar.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::ProgressCallback;

/// Progress display backed by an indicatif progress bar
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Create a console progress display. The bar length is set when
    /// the pipeline reports the page total.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("  [{bar:40}] {pos}/{len} pages")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
    }

    fn on_page_processed(&self, page_number: usize) {
        self.bar.set_position(page_number as u64);
    }

    fn on_finish(&self, output_path: &Path) {
        self.bar.finish();
        println!("Wrote {}", output_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_progress_hooks_do_not_panic() {
        let progress = ConsoleProgress::new();
        progress.on_start(10);
        progress.on_page_processed(1);
        progress.on_page_processed(10);
        progress.on_finish(Path::new("out.html"));
    }
}
