use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid assessment type: {0}")]
    InvalidAssessmentType(String),

    #[error("invalid MBTI type: {0}")]
    InvalidMbtiType(String),

    #[error("invalid evaluator status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
