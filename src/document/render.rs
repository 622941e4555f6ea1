//! HTML rendering
//!
//! Pure string rendering of the output document structure: header,
//! page sections, blocks, footer. All file I/O lives in the
//! assembler; the renderer only produces fragments.

use super::types::{ContentBlock, Page};

/// Stylesheet embedded in the document header.
const CSS: &str = r#"    :root {
      --font-family-base: "Times New Roman", Times, "Liberation Serif", serif;
      --color-text: #111;
      --color-bg: #fff;
      --color-border: #e5e5e5;
      --color-text-muted: #666;
      --max-width: 720px;
    }
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
      font-family: var(--font-family-base);
      font-size: 16px;
      line-height: 1.5;
      color: var(--color-text);
      background: var(--color-bg);
    }
    .document-wrapper {
      max-width: var(--max-width);
      margin: 0 auto;
      padding: 48px 24px;
    }
    .document-header {
      margin-bottom: 48px;
      padding-bottom: 16px;
      border-bottom: 1px solid var(--color-border);
    }
    .document-title { font-size: 36px; font-weight: 400; }
    .page { margin-bottom: 48px; page-break-after: always; }
    .page-header {
      margin-bottom: 24px;
      padding-bottom: 8px;
      border-bottom: 1px solid var(--color-border);
    }
    .page-number {
      font-size: 14px;
      color: var(--color-text-muted);
      text-transform: uppercase;
      letter-spacing: 0.05em;
    }
    .page-content p { margin-bottom: 16px; }
    .formula {
      margin: 24px 0;
      padding: 16px;
      background: #fafafa;
      border-left: 3px solid var(--color-text);
      overflow-x: auto;
    }
    .formula-inline { padding: 0 4px; }
    @media print { .page { page-break-after: always; } }"#;

// ============================================================
// HTML Renderer
// ============================================================

/// Renderer for the reflowable HTML document structure
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl HtmlRenderer {
    /// Create a renderer for a document with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Render the document header, written exactly once per document
    pub fn header(&self) -> String {
        let title = escape_html(&self.title);
        let mut output = String::new();
        output.push_str("<!DOCTYPE html>\n");
        output.push_str("<html lang=\"en\">\n");
        output.push_str("<head>\n");
        output.push_str("  <meta charset=\"UTF-8\">\n");
        output.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        output.push_str(&format!("  <title>{}</title>\n", title));
        output.push_str("  <style>\n");
        output.push_str(CSS);
        output.push_str("\n  </style>\n");
        output.push_str("</head>\n");
        output.push_str("<body>\n");
        output.push_str("  <div class=\"document-wrapper\">\n");
        output.push_str("    <header class=\"document-header\">\n");
        output.push_str(&format!("      <h1 class=\"document-title\">{}</h1>\n", title));
        output.push_str("    </header>\n");
        output.push_str("    <div class=\"document-content\">\n");
        output
    }

    /// Render the document footer
    pub fn footer(&self) -> String {
        "    </div>\n  </div>\n</body>\n</html>\n".to_string()
    }

    /// Open a page section
    pub fn page_open(&self, number: usize) -> String {
        let mut output = String::new();
        output.push_str("      <article class=\"page\">\n");
        output.push_str("        <div class=\"page-header\">\n");
        output.push_str(&format!(
            "          <span class=\"page-number\">Page {}</span>\n",
            number
        ));
        output.push_str("        </div>\n");
        output.push_str("        <div class=\"page-content\">\n");
        output
    }

    /// Close a page section
    pub fn page_close(&self) -> String {
        "        </div>\n      </article>\n".to_string()
    }

    /// Render a single block. Blocks that reduce to whitespace render
    /// to the empty string; the assembler decides on placeholders.
    pub fn render_block(&self, block: &ContentBlock) -> String {
        match block {
            ContentBlock::Text(text) => {
                let text = text.text.trim();
                if text.is_empty() {
                    return String::new();
                }
                format!("          <p>{}</p>\n", escape_html(text))
            }
            ContentBlock::Formula(formula) => {
                let source = formula.source.trim();
                if source.is_empty() {
                    return String::new();
                }
                let class = if formula.inline {
                    "formula formula-inline"
                } else {
                    "formula"
                };
                let mut output = String::new();
                output.push_str(&format!("          <div class=\"{}\">\n", class));
                output.push_str(&format!(
                    "            <math xmlns=\"http://www.w3.org/1998/Math/MathML\">{}</math>\n",
                    escape_html(source)
                ));
                output.push_str("          </div>\n");
                output
            }
        }
    }

    /// Render a complete page section. Expects a validated page; any
    /// residual whitespace-only blocks render to nothing.
    pub fn render_page(&self, page: &Page) -> String {
        let mut output = self.page_open(page.number);
        for block in &page.blocks {
            output.push_str(&self.render_block(block));
        }
        output.push_str(&self.page_close());
        output
    }
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_html("\"quoted\" 'text'"), "&quot;quoted&quot; &#39;text&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_header_contains_escaped_title() {
        let renderer = HtmlRenderer::new("Math & Logic");
        let header = renderer.header();
        assert!(header.starts_with("<!DOCTYPE html>"));
        assert!(header.contains("<title>Math &amp; Logic</title>"));
        assert!(header.contains("Math &amp; Logic</h1>"));
        assert!(header.contains("document-content"));
    }

    #[test]
    fn test_footer_closes_document() {
        let renderer = HtmlRenderer::new("T");
        let footer = renderer.footer();
        assert!(footer.contains("</body>"));
        assert!(footer.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_text_block() {
        let renderer = HtmlRenderer::new("T");
        let html = renderer.render_block(&ContentBlock::text("  Hello <world>  "));
        assert_eq!(html, "          <p>Hello &lt;world&gt;</p>\n");
    }

    #[test]
    fn test_render_empty_block() {
        let renderer = HtmlRenderer::new("T");
        assert_eq!(renderer.render_block(&ContentBlock::text("   ")), "");
        assert_eq!(renderer.render_block(&ContentBlock::formula("", false)), "");
    }

    #[test]
    fn test_render_formula_block() {
        let renderer = HtmlRenderer::new("T");
        let html = renderer.render_block(&ContentBlock::formula("x + y", false));
        assert!(html.contains("class=\"formula\""));
        assert!(html.contains("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">"));

        let inline = renderer.render_block(&ContentBlock::formula("x^2", true));
        assert!(inline.contains("formula-inline"));
    }

    #[test]
    fn test_render_page() {
        let renderer = HtmlRenderer::new("T");
        let page = Page::with_blocks(
            4,
            vec![
                ContentBlock::text("First paragraph"),
                ContentBlock::text(""),
                ContentBlock::formula("a = b", false),
            ],
        );
        let html = renderer.render_page(&page);
        assert!(html.contains("Page 4"));
        assert!(html.contains("<p>First paragraph</p>"));
        assert!(html.contains("a = b"));
        assert!(html.starts_with("      <article class=\"page\">"));
        assert!(html.ends_with("      </article>\n"));
    }
}
