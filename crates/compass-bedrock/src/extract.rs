//! Model prompts that ask for an MBTI type.
//!
//! Each function returns the raw reply. Callers validate it; a reply of
//! `UNKNOWN` (or anything that is not a type code) means the model found
//! nothing.

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, DocumentBlock, DocumentFormat, DocumentSource, ImageBlock, ImageFormat,
    ImageSource,
};
use aws_smithy_types::Blob;
use tracing::info;

use crate::converse::converse_once;
use crate::error::BedrockError;

/// Longest report excerpt sent to the text model.
pub const MAX_PROMPT_CHARS: usize = 12_000;

const REPLY_TOKENS: i32 = 16;

const SYSTEM_PROMPT: &str = "\
You read personality assessment reports. Identify the four-letter \
Myers-Briggs type the report assigns to the person (for example INTJ or \
ESFP). Reply with the four letters only. If the report does not state a \
type, reply UNKNOWN.";

/// Ask a text model to read the type out of extracted report text.
pub async fn identify_type_from_text(
    client: &Client,
    model_id: &str,
    text: &str,
) -> Result<String, BedrockError> {
    let excerpt = truncate_chars(text, MAX_PROMPT_CHARS);
    info!(model_id, chars = excerpt.chars().count(), "asking text model for type");

    let prompt = format!("Report text:\n\n{excerpt}\n\nWhich type does this report assign?");
    converse_once(
        client,
        model_id,
        SYSTEM_PROMPT,
        vec![ContentBlock::Text(prompt)],
        REPLY_TOKENS,
    )
    .await
}

/// Send the whole PDF as a `DocumentBlock` and let the model locate the type.
pub async fn identify_type_from_document(
    client: &Client,
    model_id: &str,
    pdf: &[u8],
    filename: &str,
) -> Result<String, BedrockError> {
    let doc_block = DocumentBlock::builder()
        .format(DocumentFormat::Pdf)
        .name(sanitize_document_name(filename))
        .source(DocumentSource::Bytes(Blob::new(pdf)))
        .build()
        .map_err(|e| BedrockError::Build(e.to_string()))?;

    info!(model_id, filename, bytes = pdf.len(), "asking document model for type");

    converse_once(
        client,
        model_id,
        SYSTEM_PROMPT,
        vec![
            ContentBlock::Document(doc_block),
            ContentBlock::Text("Which type does this report assign?".to_string()),
        ],
        REPLY_TOKENS,
    )
    .await
}

/// Send rendered page images (PNG) to a vision-capable model.
pub async fn identify_type_from_images(
    client: &Client,
    model_id: &str,
    pages: &[Vec<u8>],
) -> Result<String, BedrockError> {
    let mut content = Vec::with_capacity(pages.len() + 1);
    for page in pages {
        let image = ImageBlock::builder()
            .format(ImageFormat::Png)
            .source(ImageSource::Bytes(Blob::new(page.as_slice())))
            .build()
            .map_err(|e| BedrockError::Build(e.to_string()))?;
        content.push(ContentBlock::Image(image));
    }
    content.push(ContentBlock::Text(
        "These are the pages of a report. Which type does it assign?".to_string(),
    ));

    info!(model_id, pages = pages.len(), "asking vision model for type");

    converse_once(client, model_id, SYSTEM_PROMPT, content, REPLY_TOKENS).await
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Sanitize a filename for use as a Bedrock `DocumentBlock` name.
///
/// The name field only allows alphanumeric characters, single whitespace,
/// hyphens, parentheses, and square brackets.
fn sanitize_document_name(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());
    let mut prev_space = false;
    for c in filename.chars() {
        let c = if c.is_alphanumeric() || matches!(c, '-' | '(' | ')' | '[' | ']') {
            c
        } else {
            ' '
        };
        if c == ' ' && prev_space {
            continue;
        }
        prev_space = c == ' ';
        result.push(c);
    }

    let trimmed = result.trim();
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names_are_sanitized() {
        assert_eq!(sanitize_document_name("my_report (final).pdf"), "my report (final) pdf");
        assert_eq!(sanitize_document_name("..."), "report");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
