use uuid::Uuid;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::state::{load_all, load_state, save_state};
use crate::store::ObjectStore;

/// Stored questions for a type, sorted by `order`.
pub async fn list_questions(
    store: &dyn ObjectStore,
    assessment_type: AssessmentType,
) -> Result<Vec<AssessmentQuestion>, StorageError> {
    let mut questions: Vec<AssessmentQuestion> =
        load_all(store, &s3_keys::questions_prefix(assessment_type)).await?;
    questions.sort_by_key(|q| (q.order, q.created_at));
    Ok(questions)
}

pub async fn get_question(
    store: &dyn ObjectStore,
    assessment_type: AssessmentType,
    id: Uuid,
) -> Result<AssessmentQuestion, StorageError> {
    load_state(store, &s3_keys::question(assessment_type, id)).await
}

pub async fn save_question(
    store: &dyn ObjectStore,
    question: &AssessmentQuestion,
) -> Result<(), StorageError> {
    save_state(
        store,
        &s3_keys::question(question.assessment_type, question.id),
        question,
    )
    .await
}

pub async fn delete_question(
    store: &dyn ObjectStore,
    assessment_type: AssessmentType,
    id: Uuid,
) -> Result<(), StorageError> {
    let key = s3_keys::question(assessment_type, id);
    // Surface 404 for unknown ids rather than silently succeeding.
    store.get(&key).await?;
    store.delete(&key).await
}

/// Install a question bank for a type that has none stored. Returns the
/// number of questions written, or 0 when the type is already populated.
pub async fn seed_questions(
    store: &dyn ObjectStore,
    assessment_type: AssessmentType,
    bank: &[AssessmentQuestion],
) -> Result<usize, StorageError> {
    if !store.list(&s3_keys::questions_prefix(assessment_type)).await?.is_empty() {
        return Ok(0);
    }
    for question in bank {
        save_question(store, question).await?;
    }
    tracing::info!(assessment_type = %assessment_type, count = bank.len(), "seeded question bank");
    Ok(bank.len())
}
