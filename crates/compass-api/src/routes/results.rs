use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::result::AssessmentResult;
use compass_storage::results;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::parse_type;
use crate::state::AppState;

pub async fn list_results(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AssessmentResult>>, ApiError> {
    let mut results = results::list_results(state.store(), auth.id).await?;
    results.sort_by_key(|r| r.assessment_type);
    Ok(Json(results))
}

pub async fn get_result(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let assessment_type = parse_type(&kind)?;
    let result = results::get_result(state.store(), auth.id, assessment_type)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {assessment_type} result")))?;
    Ok(Json(result))
}

pub async fn delete_result(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<StatusCode, ApiError> {
    let assessment_type = parse_type(&kind)?;
    if !results::delete_result(state.store(), auth.id, assessment_type).await? {
        return Err(ApiError::NotFound(format!("no {assessment_type} result")));
    }
    AuditEvent::new(
        AuditAction::DeleteResult,
        "result",
        assessment_type.as_str(),
        Some(auth.id),
    )
    .emit();
    Ok(StatusCode::NO_CONTENT)
}
