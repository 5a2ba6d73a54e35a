use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::ExportError;
use crate::layout::{self, Block, Span};
use crate::styles::ReportStyles;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;
const SCORE_COLUMN: f32 = 140.0;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// A4 pages, Helvetica, top-down cursor with automatic page breaks.
struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Writer {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    /// Move the cursor down, breaking the page when it runs out.
    fn advance(&mut self, mm: f32) {
        self.y -= mm;
        if self.y < BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    /// Spans on one line when they fit, otherwise plain wrapped text.
    fn spans(&mut self, spans: &[Span], x: f32, size: f32, wrap: usize) {
        let line_height = size * PT_TO_MM * 1.4;
        let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
        if joined.chars().count() <= wrap {
            let mut cursor = x;
            for span in spans {
                self.text(&span.text, size, cursor, span.bold);
                cursor += text_width(&span.text, size);
            }
            self.advance(line_height);
            return;
        }
        for line in wrap_text(&joined, wrap) {
            self.text(&line, size, x, false);
            self.advance(line_height);
        }
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
    }
}

/// Generate a PDF from rendered report text.
pub fn generate_pdf(title: &str, rendered: &str, styles: &ReportStyles) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(title)?;
    let body = styles.body_size as f32;
    let wrap = styles.pdf_wrap_chars;

    for block in layout::parse(rendered) {
        match block {
            Block::Blank => writer.advance(body * PT_TO_MM * 0.8),
            Block::PageBreak => writer.new_page(),
            Block::Heading { level, text } => {
                let size = styles.heading_size(level) as f32;
                writer.advance(size * PT_TO_MM * 0.4);
                writer.text(&text, size, LEFT, true);
                writer.advance(size * PT_TO_MM * 1.5);
            }
            Block::Paragraph(spans) => writer.spans(&spans, LEFT, body, wrap),
            Block::Bullet(spans) => {
                writer.text("-", body, LEFT + 1.0, false);
                writer.spans(&spans, INDENT, body, wrap.saturating_sub(5));
            }
            Block::Score { label, value } => {
                writer.text(&label, body, INDENT, false);
                writer.text(&value, body, SCORE_COLUMN, true);
                writer.advance(body * PT_TO_MM * 1.5);
            }
        }
    }

    writer.finish()
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_pdf_bytes() {
        let bytes = generate_pdf(
            "Report",
            "# Report\n\n**Result:** Purpose\n| Physical | 50.0% |\n- item\n---\nDone",
            &ReportStyles::default(),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_reports_span_pages() {
        let styles = ReportStyles::default();
        let short = generate_pdf("Short", "Line", &styles).unwrap();
        let long: String = (0..200).map(|i| format!("Line {i}\n")).collect();
        let long = generate_pdf("Long", &long, &styles).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn wrapping_respects_width() {
        let lines = wrap_text("one two three four five six", 10);
        assert!(lines.iter().all(|l| l.len() <= 10));
        assert_eq!(lines.join(" "), "one two three four five six");
    }
}
