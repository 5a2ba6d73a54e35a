use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::assessment_type::AssessmentType;

/// A single questionnaire item.
///
/// For Likert instruments `content` is the statement shown to the user and
/// `category` the scoring bucket. For TKI `content` is a JSON-encoded pair of
/// statements, each tagged with a conflict mode.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentQuestion {
    pub id: Uuid,
    pub assessment_type: AssessmentType,
    pub content: String,
    pub category: String,
    pub order: u32,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Fields an administrator may set when creating or editing a question.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionInput {
    pub assessment_type: AssessmentType,
    pub content: String,
    pub category: String,
    pub order: u32,
}

impl AssessmentQuestion {
    pub fn from_input(input: QuestionInput) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            assessment_type: input.assessment_type,
            content: input.content,
            category: input.category,
            order: input.order,
            created_at: now,
            updated_at: now,
        }
    }
}
