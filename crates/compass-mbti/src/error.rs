use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Every stage ran and none produced a valid type.
    #[error("no MBTI type could be found in the document")]
    NoTypeFound,

    #[error("PDF parsing failed: {0}")]
    Pdf(String),

    #[error("image decoding failed: {0}")]
    Image(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("model call failed: {0}")]
    Model(#[from] compass_bedrock::error::BedrockError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
