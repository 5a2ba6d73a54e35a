use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::evaluator::{Evaluator, EvaluatorStatus, Relationship};
use compass_mail::templates;
use compass_storage::{evaluators, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::{require_non_empty, validate_email};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateEvaluatorRequest {
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
}

pub async fn list_evaluators(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Evaluator>>, ApiError> {
    Ok(Json(evaluators::list_evaluators(state.store(), auth.id).await?))
}

pub async fn create_evaluator(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateEvaluatorRequest>,
) -> Result<(StatusCode, Json<Evaluator>), ApiError> {
    require_non_empty("name", &body.name)?;
    validate_email(&body.email)?;

    let evaluator = Evaluator::new(
        auth.id,
        body.name.trim().to_string(),
        body.email.trim().to_string(),
        body.relationship,
    );
    evaluators::save_evaluator(state.store(), &evaluator).await?;

    AuditEvent::new(
        AuditAction::CreateEvaluator,
        "evaluator",
        evaluator.id.to_string(),
        Some(auth.id),
    )
    .emit();
    Ok((StatusCode::CREATED, Json(evaluator)))
}

/// Send (or resend) the invitation email and mark the evaluator invited.
pub async fn invite_evaluator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Evaluator>, ApiError> {
    let mut evaluator = evaluators::get_evaluator(state.store(), auth.id, id).await?;
    if !evaluator.status.can_advance_to(EvaluatorStatus::Invited) {
        return Err(ApiError::Conflict(format!(
            "evaluator is already {}",
            evaluator.status
        )));
    }

    let subject = users::get_user(state.store(), auth.id).await?;
    let link = templates::evaluation_link(&state.config.public_url, &evaluator.token);
    let email = templates::evaluator_invitation(
        &evaluator.email,
        &evaluator.name,
        &subject.name,
        relationship_label(evaluator.relationship),
        &link,
    )?;
    state.mailer.send(&email).await?;

    evaluator.advance(EvaluatorStatus::Invited, jiff::Timestamp::now())?;
    evaluators::save_evaluator(state.store(), &evaluator).await?;

    AuditEvent::new(
        AuditAction::InviteEvaluator,
        "evaluator",
        evaluator.id.to_string(),
        Some(auth.id),
    )
    .emit();
    Ok(Json(evaluator))
}

/// Completed evaluators hold feedback already counted in comparisons and
/// cannot be deleted.
pub async fn delete_evaluator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let evaluator = evaluators::get_evaluator(state.store(), auth.id, id).await?;
    if evaluator.is_completed() {
        return Err(ApiError::Conflict(
            "completed evaluators cannot be deleted".to_string(),
        ));
    }
    evaluators::delete_evaluator(state.store(), &evaluator).await?;

    AuditEvent::new(
        AuditAction::DeleteEvaluator,
        "evaluator",
        evaluator.id.to_string(),
        Some(auth.id),
    )
    .with_details(serde_json::json!({ "status": evaluator.status.to_string() }))
    .emit();
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn relationship_label(relationship: Relationship) -> &'static str {
    match relationship {
        Relationship::Peer => "peer",
        Relationship::Manager => "manager",
        Relationship::DirectReport => "direct report",
        Relationship::Other => "colleague",
    }
}
