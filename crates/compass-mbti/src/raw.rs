//! Last-resort text recovery from the raw file bytes.
//!
//! Broken or unusual PDFs often defeat the text extractor while the type
//! code still sits in a content stream. The raw bytes (plus any stream
//! lopdf can decompress) are scanned with three heuristics, in order.

use std::sync::LazyLock;

use lopdf::{Document, Object};
use regex::Regex;

use compass_core::models::mbti::MbtiType;

use crate::patterns::find_type;

static PAREN_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(((?:[^()\\]|\\.){1,200})\)").expect("literal pattern compiles"));

static TJ_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]{1,2000})\]\s*TJ").expect("TJ pattern compiles"));

static LETTER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z '’:\-]{3,}").expect("run pattern compiles"));

/// Scan raw PDF bytes for a type code.
pub fn scan(pdf: &[u8]) -> Option<MbtiType> {
    let mut sources = vec![String::from_utf8_lossy(pdf).into_owned()];
    sources.extend(decompressed_streams(pdf));

    let heuristics: [fn(&str) -> String; 3] = [parenthesized_strings, tj_arrays, letter_runs];
    for heuristic in heuristics {
        for source in &sources {
            let candidate = heuristic(source);
            if candidate.is_empty() {
                continue;
            }
            if let Some(found) = find_type(&candidate) {
                return Some(found);
            }
        }
    }
    None
}

fn decompressed_streams(pdf: &[u8]) -> Vec<String> {
    let Ok(document) = Document::load_mem(pdf) else {
        return Vec::new();
    };
    document
        .objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) => stream.decompressed_content().ok(),
            _ => None,
        })
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .collect()
}

/// The contents of `( ... )` string literals, one per line.
fn parenthesized_strings(source: &str) -> String {
    PAREN_STRING
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| unescape(m.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text of `[ ... ] TJ` arrays, with kerning numbers dropped and the
/// pieces of each array joined.
fn tj_arrays(source: &str) -> String {
    TJ_ARRAY
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| {
            PAREN_STRING
                .captures_iter(m.as_str())
                .filter_map(|c| c.get(1))
                .map(|piece| unescape(piece.as_str()))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs of letters, spaces and light punctuation.
fn letter_runs(source: &str) -> String {
    LETTER_RUN
        .find_iter(source)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_strings_are_scanned() {
        let raw = b"%PDF-1.4\nBT /F1 12 Tf (Your type is ENTP) Tj ET";
        assert_eq!(scan(raw).map(|t| t.to_string()).as_deref(), Some("ENTP"));
    }

    #[test]
    fn kerned_arrays_are_joined() {
        let source = "BT [(Your type ) -120 (is IS) 40 (FJ)] TJ ET";
        assert_eq!(tj_arrays(source), "Your type is ISFJ");
        assert_eq!(
            scan(source.as_bytes()).map(|t| t.to_string()).as_deref(),
            Some("ISFJ")
        );
    }

    #[test]
    fn escapes_are_resolved() {
        assert_eq!(unescape(r"a\(b\)\\c"), r"a(b)\c");
    }

    #[test]
    fn nothing_in_noise() {
        assert!(scan(&[0u8, 159, 146, 150, 1, 2, 3]).is_none());
    }
}
