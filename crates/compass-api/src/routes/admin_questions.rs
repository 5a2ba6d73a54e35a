use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::{AssessmentQuestion, QuestionInput};
use compass_instruments::instrument_for;
use compass_instruments::instruments::tki::TkiPair;
use compass_storage::questions;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::{parse_type, require_non_empty};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QuestionFilter {
    #[serde(rename = "type")]
    pub assessment_type: Option<String>,
}

#[derive(Serialize)]
pub struct SeedResponse {
    pub inserted: usize,
}

fn reject_mbti(assessment_type: AssessmentType) -> Result<(), ApiError> {
    if assessment_type == AssessmentType::Mbti {
        return Err(ApiError::BadRequest("MBTI has no question bank".to_string()));
    }
    Ok(())
}

/// TKI content must be a statement pair; its category is derived from the
/// two modes rather than taken from the request.
fn normalize_tki(question: &mut AssessmentQuestion) -> Result<(), ApiError> {
    if question.assessment_type != AssessmentType::Tki {
        return Ok(());
    }
    let pair = TkiPair::parse(question)
        .map_err(|e| ApiError::BadRequest(format!("invalid TKI content: {e}")))?;
    question.category = pair.category();
    Ok(())
}

/// Stored questions, for one type or all of them.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(filter): Query<QuestionFilter>,
) -> Result<Json<Vec<AssessmentQuestion>>, ApiError> {
    let types = match filter.assessment_type.as_deref() {
        Some(kind) => vec![parse_type(kind)?],
        None => AssessmentType::ALL.to_vec(),
    };
    let mut all = Vec::new();
    for assessment_type in types {
        all.extend(questions::list_questions(state.store(), assessment_type).await?);
    }
    Ok(Json(all))
}

pub async fn create_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<QuestionInput>,
) -> Result<(StatusCode, Json<AssessmentQuestion>), ApiError> {
    reject_mbti(input.assessment_type)?;
    require_non_empty("content", &input.content)?;
    if input.assessment_type != AssessmentType::Tki {
        require_non_empty("category", &input.category)?;
    }

    let mut question = AssessmentQuestion::from_input(input);
    normalize_tki(&mut question)?;
    questions::save_question(state.store(), &question).await?;

    AuditEvent::new(
        AuditAction::SaveQuestion,
        "question",
        question.id.to_string(),
        Some(auth.id),
    )
    .emit();
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn update_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(input): Json<QuestionInput>,
) -> Result<Json<AssessmentQuestion>, ApiError> {
    let assessment_type = parse_type(&kind)?;
    if input.assessment_type != assessment_type {
        return Err(ApiError::BadRequest(
            "a question cannot move between assessment types".to_string(),
        ));
    }
    require_non_empty("content", &input.content)?;
    if input.assessment_type != AssessmentType::Tki {
        require_non_empty("category", &input.category)?;
    }

    let mut question = questions::get_question(state.store(), assessment_type, id).await?;
    question.content = input.content;
    question.category = input.category;
    question.order = input.order;
    normalize_tki(&mut question)?;
    question.updated_at = jiff::Timestamp::now();
    questions::save_question(state.store(), &question).await?;

    AuditEvent::new(AuditAction::SaveQuestion, "question", id.to_string(), Some(auth.id)).emit();
    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let assessment_type = parse_type(&kind)?;
    questions::delete_question(state.store(), assessment_type, id).await?;
    AuditEvent::new(AuditAction::DeleteQuestion, "question", id.to_string(), Some(auth.id)).emit();
    Ok(StatusCode::NO_CONTENT)
}

/// Install the built-in bank for a type that has no stored questions.
pub async fn seed_questions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<SeedResponse>, ApiError> {
    let assessment_type = parse_type(&kind)?;
    reject_mbti(assessment_type)?;
    let bank = instrument_for(assessment_type).default_questions();
    let inserted = questions::seed_questions(state.store(), assessment_type, &bank).await?;

    AuditEvent::new(
        AuditAction::SeedQuestions,
        "question",
        assessment_type.as_str(),
        Some(auth.id),
    )
    .with_details(serde_json::json!({ "inserted": inserted }))
    .emit();
    Ok(Json(SeedResponse { inserted }))
}
