use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::assessment_type::AssessmentType;
use compass_export::render::ReportData;
use compass_export::styles::ReportStyles;
use compass_export::{ExportFormat, export_report as render_export};
use compass_instruments::instrument_for;
use compass_storage::{reports, results, subscriptions, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::parse_type;
use crate::routes::three_sixty::comparison_for;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
}

/// Export a result as PDF or DOCX. Needs an active subscription unless the
/// caller is an administrator.
pub async fn export_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Json(body): Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assessment_type = parse_type(&kind)?;

    if !auth.is_admin() {
        let subscription = subscriptions::get_subscription(state.store(), auth.id).await?;
        if !subscription.is_active() {
            return Err(ApiError::Forbidden(
                "an active subscription is required to export reports".to_string(),
            ));
        }
    }

    let result = results::get_result(state.store(), auth.id, assessment_type)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {assessment_type} result")))?;
    let user = users::get_user(state.store(), auth.id).await?;

    let comparison = if assessment_type == AssessmentType::ThreeSixty {
        comparison_for(&state, auth.id).await?.1
    } else {
        Vec::new()
    };

    let instrument = instrument_for(assessment_type);
    let data = ReportData::from_result(
        instrument.as_ref(),
        &result,
        &user.name,
        &comparison,
        jiff::Timestamp::now(),
    );
    let bytes = render_export(&data, body.format, &ReportStyles::default())?;

    let key = match body.format {
        ExportFormat::Pdf => {
            reports::save_pdf(state.store(), auth.id, assessment_type, bytes.clone()).await?
        }
        ExportFormat::Docx => {
            reports::save_docx(state.store(), auth.id, assessment_type, bytes.clone()).await?
        }
    };

    AuditEvent::new(AuditAction::ExportReport, "report", key, Some(auth.id))
        .with_details(serde_json::json!({ "format": body.format.extension() }))
        .emit();

    let disposition = format!(
        "attachment; filename=\"compass-{}.{}\"",
        assessment_type.as_str(),
        body.format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, body.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
