use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("answers are malformed: {0}")]
    MalformedAnswers(String),

    #[error("no answers submitted")]
    NoAnswers,

    #[error("answer given for unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("question '{0}' was not answered")]
    MissingAnswer(String),

    #[error("answer {value} for question '{question_id}' is outside 1-5")]
    OutOfRange { question_id: String, value: u8 },

    #[error("question '{question_id}' is malformed: {reason}")]
    InvalidQuestion { question_id: String, reason: String },

    #[error("{0} has no questionnaire to score")]
    NotQuestionnaire(String),

    #[error(transparent)]
    Core(#[from] compass_core::error::CoreError),
}
