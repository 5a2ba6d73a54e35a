//! The line grammar rendered templates are written in:
//!
//! - `# `, `## `, `### ` headings
//! - `- item` bullets
//! - `| label | value |` score rows
//! - `---` page break
//! - `**bold**` inline, anywhere in a paragraph or bullet
//! - blank line: vertical space; anything else: a paragraph

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<Span>),
    Bullet(Vec<Span>),
    Score { label: String, value: String },
    PageBreak,
    Blank,
}

pub fn parse(rendered: &str) -> Vec<Block> {
    rendered.lines().map(|line| parse_line(line.trim())).collect()
}

fn parse_line(line: &str) -> Block {
    if line.is_empty() {
        return Block::Blank;
    }
    if line == "---" || line == "***" {
        return Block::PageBreak;
    }
    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                text: text.trim().to_string(),
            };
        }
    }
    if let Some(text) = line.strip_prefix("- ") {
        return Block::Bullet(parse_inline(text));
    }
    if let Some(row) = line.strip_prefix('|').and_then(|r| r.strip_suffix('|')) {
        if let Some((label, value)) = row.split_once('|') {
            return Block::Score {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            };
        }
    }
    Block::Paragraph(parse_inline(line))
}

/// Split `**bold**` segments out of a line. An unmatched `**` is literal.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("**") {
        let after_start = &remaining[start + 2..];
        let Some(end) = after_start.find("**") else {
            break;
        };
        if start > 0 {
            spans.push(Span::plain(&remaining[..start]));
        }
        spans.push(Span {
            text: after_start[..end].to_string(),
            bold: true,
        });
        remaining = &after_start[end + 2..];
    }

    if !remaining.is_empty() {
        spans.push(Span::plain(remaining));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_each_line_kind() {
        let blocks = parse("# Title\n\n## Scores\n| Physical | 75.0 |\n- **Peer:** 4\n---\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "Title".into() },
                Block::Blank,
                Block::Heading { level: 2, text: "Scores".into() },
                Block::Score { label: "Physical".into(), value: "75.0".into() },
                Block::Bullet(vec![
                    Span { text: "Peer:".into(), bold: true },
                    Span::plain(" 4"),
                ]),
                Block::PageBreak,
                Block::Paragraph(vec![Span::plain("plain")]),
            ]
        );
    }

    #[test]
    fn unmatched_bold_marker_is_literal() {
        assert_eq!(parse_inline("a **b"), vec![Span::plain("a **b")]);
    }
}
