use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;
use compass_core::models::result::AssessmentResult;
use compass_instruments::scoring::Scored;
use compass_instruments::{Instrument, instrument_for};
use compass_mail::templates;
use compass_storage::store::ObjectStore;
use compass_storage::{questions, results, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::parse_type;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub answers: serde_json::Value,
}

/// Stored questions for a type, or the instrument's built-in bank when none
/// have been stored.
pub(crate) async fn active_questions(
    store: &dyn ObjectStore,
    assessment_type: AssessmentType,
) -> Result<Vec<AssessmentQuestion>, ApiError> {
    let stored = questions::list_questions(store, assessment_type).await?;
    if !stored.is_empty() {
        return Ok(stored);
    }
    Ok(instrument_for(assessment_type).default_questions())
}

pub async fn get_questions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<Vec<AssessmentQuestion>>, ApiError> {
    let assessment_type = parse_type(&kind)?;
    if assessment_type == AssessmentType::Mbti {
        return Err(ApiError::BadRequest(
            "MBTI is captured by uploading a report".to_string(),
        ));
    }
    Ok(Json(active_questions(state.store(), assessment_type).await?))
}

pub async fn submit_assessment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let assessment_type = parse_type(&kind)?;
    if assessment_type == AssessmentType::Mbti {
        return Err(ApiError::BadRequest(
            "MBTI is captured by uploading a report".to_string(),
        ));
    }

    let instrument = instrument_for(assessment_type);
    let questions = active_questions(state.store(), assessment_type).await?;
    let scored = instrument.score(&questions, &body.answers)?;

    let result = store_result(&state, auth.id, assessment_type, body.answers, scored).await?;

    AuditEvent::new(
        AuditAction::SubmitAssessment,
        "result",
        assessment_type.as_str(),
        Some(auth.id),
    )
    .with_details(serde_json::json!({ "dominant": result.dominant_result }))
    .emit();

    notify_completed(&state, instrument.as_ref(), &result).await;
    Ok(Json(result))
}

/// Build and upsert a result. One result per (user, type): this replaces any
/// earlier submission.
pub(crate) async fn store_result(
    state: &AppState,
    user_id: Uuid,
    assessment_type: AssessmentType,
    answers: serde_json::Value,
    scored: Scored,
) -> Result<AssessmentResult, ApiError> {
    let result = AssessmentResult {
        id: Uuid::new_v4(),
        user_id,
        assessment_type,
        answers,
        scores: scored.scores,
        overall_score: scored.overall_score,
        dominant_result: scored.dominant_result,
        completed_at: jiff::Timestamp::now(),
    };
    results::upsert_result(state.store(), &result).await?;
    tracing::info!(
        user_id = %user_id,
        assessment_type = %assessment_type,
        dominant = %result.dominant_result,
        "result stored"
    );
    Ok(result)
}

/// Completion email. Failures are logged; the result is already stored.
pub(crate) async fn notify_completed(
    state: &AppState,
    instrument: &dyn Instrument,
    result: &AssessmentResult,
) {
    let user = match users::get_user(state.store(), result.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(user_id = %result.user_id, error = %e, "no user for completion email");
            return;
        }
    };
    let dominant = instrument
        .categories()
        .iter()
        .find(|c| c.id == result.dominant_result)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| result.dominant_result.clone());

    let sent = match templates::assessment_completed(
        &user.email,
        &user.name,
        result.assessment_type.display_name(),
        &dominant,
        &state.config.public_url,
    ) {
        Ok(email) => state.mailer.send(&email).await,
        Err(e) => Err(e),
    };
    if let Err(e) = sent {
        tracing::warn!(user_id = %user.id, error = %e, "completion email failed");
    }
}
