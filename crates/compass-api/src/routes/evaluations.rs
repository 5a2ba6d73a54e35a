//! Public evaluator pages, reached through the invitation token.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::evaluator::{Evaluator, EvaluatorStatus, Relationship};
use compass_core::models::question::AssessmentQuestion;
use compass_instruments::instrument_for;
use compass_instruments::scoring::parse_likert_answers;
use compass_storage::{evaluators, users};

use crate::error::ApiError;
use crate::routes::assessments::active_questions;
use crate::state::AppState;

#[derive(Serialize)]
pub struct EvaluationPage {
    pub evaluator_name: String,
    pub subject_name: String,
    pub relationship: Relationship,
    pub status: EvaluatorStatus,
    pub questions: Vec<AssessmentQuestion>,
}

#[derive(Deserialize)]
pub struct EvaluationSubmission {
    pub answers: serde_json::Value,
}

#[derive(Serialize)]
pub struct EvaluationReceipt {
    pub status: EvaluatorStatus,
}

async fn open_evaluation(state: &AppState, token: &str) -> Result<Evaluator, ApiError> {
    let evaluator = evaluators::find_by_token(state.store(), token)
        .await?
        .ok_or_else(|| ApiError::NotFound("evaluation not found".to_string()))?;
    if evaluator.is_completed() {
        return Err(ApiError::Conflict(
            "this evaluation has already been submitted".to_string(),
        ));
    }
    Ok(evaluator)
}

pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<EvaluationPage>, ApiError> {
    let mut evaluator = open_evaluation(&state, &token).await?;
    let subject = users::get_user(state.store(), evaluator.user_id).await?;

    if evaluator.status != EvaluatorStatus::Started {
        evaluator.advance(EvaluatorStatus::Started, jiff::Timestamp::now())?;
        evaluators::save_evaluator(state.store(), &evaluator).await?;
    }

    Ok(Json(EvaluationPage {
        evaluator_name: evaluator.name,
        subject_name: subject.name,
        relationship: evaluator.relationship,
        status: evaluator.status,
        questions: active_questions(state.store(), AssessmentType::ThreeSixty).await?,
    }))
}

pub async fn submit_evaluation(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<EvaluationSubmission>,
) -> Result<Json<EvaluationReceipt>, ApiError> {
    let mut evaluator = open_evaluation(&state, &token).await?;

    // Scoring validates ids and ranges against the live question set.
    let questions = active_questions(state.store(), AssessmentType::ThreeSixty).await?;
    instrument_for(AssessmentType::ThreeSixty).score(&questions, &body.answers)?;
    let answers = parse_likert_answers(&body.answers)?;

    evaluator.answers = Some(answers);
    evaluator.advance(EvaluatorStatus::Completed, jiff::Timestamp::now())?;
    evaluators::save_evaluator(state.store(), &evaluator).await?;

    AuditEvent::new(
        AuditAction::SubmitEvaluation,
        "evaluator",
        evaluator.id.to_string(),
        None,
    )
    .with_details(serde_json::json!({ "subject": evaluator.user_id }))
    .emit();
    Ok(Json(EvaluationReceipt {
        status: evaluator.status,
    }))
}
