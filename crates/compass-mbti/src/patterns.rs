//! The regex cascade. Patterns are tried in order and the first match that
//! names one of the 16 codes wins.

use std::sync::LazyLock;

use regex::Regex;

use compass_core::models::mbti::{MbtiType, MBTI_CODES};

const CODE: &str = "([EI][NS][FT][JP])";

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "type is INFP", "Type: INFP", "personality type INFP"
        format!(r"(?i:\btype\s*(?:is\s*|:\s*|-\s*)?)\(?{CODE}\b"),
        // "(ISFP-T)"
        format!(r"\({CODE}-[AT]\)"),
        // "ISFP-T"
        format!(r"\b{CODE}-[AT]\b"),
        // "you are an INFP", "you're an ENTJ"
        format!(r"(?i:\byou(?:\s+are|'re|’re)\s+(?:an?\s+)?){CODE}\b"),
        // "INFP personality", "ENTJ type"
        format!(r"\b{CODE}(?i:\s+(?:personality|type))\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("cascade pattern compiles"))
    .collect()
});

static BARE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{4}\b").expect("token pattern compiles"));

/// Run the cascade over `text`.
pub fn find_type(text: &str) -> Option<MbtiType> {
    for pattern in PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            if let Some(found) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                return Some(found);
            }
        }
    }

    BARE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| MBTI_CODES.contains(token))
        .and_then(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(text: &str) -> Option<String> {
        find_type(text).map(|t| t.to_string())
    }

    #[test]
    fn stated_type_is_found() {
        assert_eq!(found("Personality type: INFP").as_deref(), Some("INFP"));
        assert_eq!(found("Your reported TYPE IS ESTJ.").as_deref(), Some("ESTJ"));
    }

    #[test]
    fn identity_suffix_is_found() {
        assert_eq!(found("Results (ISFP-T) generated today").as_deref(), Some("ISFP"));
        assert_eq!(found("Architect ENTJ-A").as_deref(), Some("ENTJ"));
    }

    #[test]
    fn phrasing_patterns_are_found() {
        assert_eq!(found("It seems you're an ENFJ at heart").as_deref(), Some("ENFJ"));
        assert_eq!(found("The ISTP personality prefers").as_deref(), Some("ISTP"));
    }

    #[test]
    fn earlier_patterns_take_priority() {
        // The bare scan would see ESTJ first.
        assert_eq!(
            found("Compared with ESTJ colleagues, your type is INFJ").as_deref(),
            Some("INFJ")
        );
    }

    #[test]
    fn bare_scan_only_accepts_valid_codes() {
        assert_eq!(found("HTML PDFS INTP notes").as_deref(), Some("INTP"));
        assert_eq!(found("HTML PDFS and nothing else"), None);
        assert_eq!(found("lowercase infp is not a code"), None);
    }

    #[test]
    fn text_without_a_code_finds_nothing() {
        assert_eq!(found("This document describes conflict modes."), None);
        assert_eq!(found(""), None);
    }
}
