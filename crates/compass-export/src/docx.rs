use std::io::Cursor;

use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType};

use crate::error::ExportError;
use crate::layout::{self, Block, Span};
use crate::styles::ReportStyles;

/// Generate a DOCX document from rendered report text.
pub fn generate_docx(rendered: &str, styles: &ReportStyles) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new();
    for level in 1..=3u8 {
        docx = docx.add_style(heading_style(level, styles.heading_size(level)));
    }

    for block in layout::parse(rendered) {
        let paragraph = match block {
            Block::Blank => Paragraph::new(),
            Block::PageBreak => Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            Block::Heading { level, text } => Paragraph::new()
                .style(&format!("Heading{level}"))
                .add_run(Run::new().add_text(text)),
            Block::Bullet(spans) => {
                let bullet = body_run("\u{2022} ", false, styles);
                spans_paragraph(Paragraph::new().add_run(bullet), &spans, styles)
            }
            Block::Paragraph(spans) => spans_paragraph(Paragraph::new(), &spans, styles),
            Block::Score { label, value } => Paragraph::new()
                .add_run(body_run(&format!("{label}: "), false, styles))
                .add_run(body_run(&value, true, styles)),
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn heading_style(level: u8, size_pt: usize) -> Style {
    Style::new(&format!("Heading{level}"), StyleType::Paragraph)
        .name(&format!("heading {level}"))
        .size(size_pt * 2) // OOXML uses half-points
        .bold()
}

fn spans_paragraph(mut paragraph: Paragraph, spans: &[Span], styles: &ReportStyles) -> Paragraph {
    paragraph = paragraph.align(AlignmentType::Left);
    for span in spans {
        paragraph = paragraph.add_run(body_run(&span.text, span.bold, styles));
    }
    paragraph
}

fn body_run(text: &str, bold: bool, styles: &ReportStyles) -> Run {
    let run = Run::new()
        .add_text(text)
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font));
    if bold { run.bold() } else { run }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_zip_container() {
        let bytes = generate_docx(
            "# Report\n\n| Physical | 50.0% |\n- **Peer:** 4\n---\nDone",
            &ReportStyles::default(),
        )
        .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
